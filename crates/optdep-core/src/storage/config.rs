use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Serialize, Deserialize};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;
use crate::storage::StorageProvider;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Formats probed, in order, when a config is looked up without an extension
    pub fn all() -> Vec<ConfigFormat> {
        vec![
            ConfigFormat::Json,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml,
        ]
    }
}

/// In-memory representation of configuration data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Raw configuration values
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from a HashMap
    pub fn from_hashmap(values: HashMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Get a configuration value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| StorageSystemError::serialization("json", e))?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with another config, overriding existing values
    pub fn merge(&mut self, other: &ConfigData) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Deserialize the whole configuration into a typed view
    pub fn to_typed<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        let value = serde_json::to_value(&self.values)
            .map_err(|e| StorageSystemError::serialization("json", e))?;
        serde_json::from_value(value)
            .map_err(|e| StorageSystemError::deserialization("json", e).into())
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let out = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self)
                .map_err(|e| StorageSystemError::serialization("json", e))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(&self)
                .map_err(|e| StorageSystemError::serialization("yaml", e))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(&self)
                .map_err(|e| StorageSystemError::serialization("toml", e))?,
        };
        Ok(out)
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Json => serde_json::from_str(data)
                .map_err(|e| StorageSystemError::deserialization("json", e))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data)
                .map_err(|e| StorageSystemError::deserialization("yaml", e))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data)
                .map_err(|e| StorageSystemError::deserialization("toml", e))?,
        };
        Ok(config)
    }
}

/// Configuration scope determines where configuration is stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigScope {
    /// Application-wide configuration
    Application,
    /// Plugin-specific configuration
    Plugin(PluginConfigScope),
}

/// Which layer of a plugin's configuration to access
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PluginConfigScope {
    /// Defaults shipped alongside the plugin
    Default,
    /// User overrides (take priority over defaults)
    User,
}

impl ConfigScope {
    fn cache_key(&self, name: &str) -> String {
        match self {
            ConfigScope::Application => format!("app:{}", name),
            ConfigScope::Plugin(PluginConfigScope::Default) => format!("plugin:default:{}", name),
            ConfigScope::Plugin(PluginConfigScope::User) => format!("plugin:user:{}", name),
        }
    }
}

/// Configuration manager that handles loading, saving, and caching configurations
#[derive(Debug)]
pub struct ConfigManager {
    /// Storage provider for reading/writing configs
    provider: Arc<dyn StorageProvider>,
    /// Base path for application configurations
    app_config_path: PathBuf,
    /// Base path for plugin configurations
    plugin_config_path: PathBuf,
    /// Default format for new configurations
    default_format: ConfigFormat,
    /// In-memory cache of loaded configurations
    cache: Mutex<HashMap<String, ConfigData>>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        app_config_path: PathBuf,
        plugin_config_path: PathBuf,
        default_format: ConfigFormat,
    ) -> Self {
        Self {
            provider,
            app_config_path,
            plugin_config_path,
            default_format,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get the app configuration path
    pub fn app_config_path(&self) -> &Path {
        &self.app_config_path
    }

    /// Get the plugin configuration path
    pub fn plugin_config_path(&self) -> &Path {
        &self.plugin_config_path
    }

    /// Get the default format
    pub fn default_format(&self) -> ConfigFormat {
        self.default_format
    }

    fn scope_dir(&self, scope: ConfigScope) -> PathBuf {
        match scope {
            ConfigScope::Application => self.app_config_path.clone(),
            ConfigScope::Plugin(PluginConfigScope::Default) => self.plugin_config_path.join("default"),
            ConfigScope::Plugin(PluginConfigScope::User) => self.plugin_config_path.join("user"),
        }
    }

    /// Resolve the path a configuration is saved to
    pub fn resolve_config_path(&self, name: &str, scope: ConfigScope) -> PathBuf {
        // Ensure name has appropriate extension
        let file_name = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{}.{}", name, self.default_format.extension())
        };
        self.scope_dir(scope).join(file_name)
    }

    /// Find an existing file for `name`, trying every supported extension
    /// when `name` has none.
    fn find_existing(&self, name: &str, scope: ConfigScope) -> Option<PathBuf> {
        let dir = self.scope_dir(scope);
        if Path::new(name).extension().is_some() {
            let path = dir.join(name);
            return self.provider.is_file(&path).then_some(path);
        }
        ConfigFormat::all()
            .into_iter()
            .map(|format| dir.join(format!("{}.{}", name, format.extension())))
            .find(|path| self.provider.is_file(path))
    }

    /// Load configuration from disk. A missing file yields an empty config.
    pub fn load_config(&self, name: &str, scope: ConfigScope) -> Result<ConfigData> {
        let cache_key = scope.cache_key(name);
        if let Some(config) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(&cache_key) {
            return Ok(config.clone());
        }

        let config = match self.find_existing(name, scope) {
            Some(path) => {
                let format = ConfigFormat::from_path(&path).ok_or_else(|| {
                    StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
                })?;
                let content = self.provider.read_to_string(&path)?;
                log::debug!("Loaded configuration '{}' from {}", name, path.display());
                ConfigData::deserialize(&content, format)?
            }
            None => ConfigData::new(),
        };

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cache_key, config.clone());
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save_config(&self, name: &str, config: &ConfigData, scope: ConfigScope) -> Result<()> {
        let path = self.resolve_config_path(name, scope);
        if let Some(parent) = path.parent() {
            self.provider.create_dir_all(parent)?;
        }

        let format = ConfigFormat::from_path(&path).unwrap_or(self.default_format);
        let content = config.serialize(format)?;
        self.provider.write_string(&path, &content)?;

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(scope.cache_key(name), config.clone());
        Ok(())
    }

    /// Get plugin configuration, user values overriding defaults
    pub fn get_plugin_config(&self, plugin_name: &str) -> Result<ConfigData> {
        let user_config = self.load_config(plugin_name, ConfigScope::Plugin(PluginConfigScope::User))?;
        let mut merged = self.load_config(plugin_name, ConfigScope::Plugin(PluginConfigScope::Default))?;
        merged.merge(&user_config);
        Ok(merged)
    }

    /// Get application configuration
    pub fn get_app_config(&self, name: &str) -> Result<ConfigData> {
        self.load_config(name, ConfigScope::Application)
    }

    /// List configuration names available in a scope
    pub fn list_configs(&self, scope: ConfigScope) -> Result<Vec<String>> {
        let dir_path = self.scope_dir(scope);
        if !self.provider.exists(&dir_path) {
            return Ok(vec![]);
        }

        let mut names: Vec<String> = self
            .provider
            .read_dir(&dir_path)?
            .into_iter()
            .filter(|path| self.provider.is_file(path) && ConfigFormat::from_path(path).is_some())
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str().map(String::from)))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Output format of the logging backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Typed view of the application configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Report callback failures raised while replaying existing providers
    /// to a new subscriber. Registration-time failures are always reported.
    pub report_replay_failures: bool,
    /// Level used when `RUST_LOG` is not set
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            report_replay_failures: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
        }
    }
}

impl BrokerConfig {
    /// Reads the application config `name` through `manager`, falling back to
    /// defaults for every missing key.
    pub fn load(manager: &ConfigManager, name: &str) -> Result<Self> {
        manager.get_app_config(name)?.to_typed()
    }

    /// Writes these settings as the application config `name`
    pub fn save(&self, manager: &ConfigManager, name: &str) -> Result<()> {
        let values = serde_json::to_value(self)
            .and_then(serde_json::from_value)
            .map_err(|e| StorageSystemError::serialization("json", e))?;
        manager.save_config(name, &ConfigData::from_hashmap(values), ConfigScope::Application)
    }
}
