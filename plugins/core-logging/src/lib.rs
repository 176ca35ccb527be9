//! Core logging plugin.
//!
//! Phase 1 installs a `tracing` subscriber and bridges `log` records into it,
//! so every crate that logs through the `log` facade ends up in one place.
//! Phase 2 publishes the optional `core-logging` API, letting other plugins
//! log through the host without depending on this crate.
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use optdep_core::kernel::error::{Error as KernelError, Result as KernelResult};
use optdep_core::plugin_system::{Plugin, PluginContext, VersionRange};
use optdep_core::storage::{BrokerConfig, ConfigData, LogFormat};
use optdep_core::Provider;

/// Name the logging API is registered under
pub const LOGGING_API: &str = "core-logging";

/// Backend settings. Plugin configuration keys `level` and `format`
/// override the values taken from the application config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::from(&BrokerConfig::default())
    }
}

impl From<&BrokerConfig> for LogSettings {
    fn from(config: &BrokerConfig) -> Self {
        Self {
            level: config.log_level.clone(),
            format: config.log_format,
        }
    }
}

impl LogSettings {
    pub fn with_overrides(&self, config: &ConfigData) -> Self {
        Self {
            level: config.get_or("level", self.level.clone()),
            format: config.get_or("format", self.format),
        }
    }

    /// Reads settings from a TOML snippet such as
    /// `level = "debug"` / `format = "json"`. Missing keys keep the defaults.
    pub fn from_toml(text: &str) -> KernelResult<Self> {
        let table: toml::Table = toml::from_str(text)
            .map_err(|e| KernelError::Other(format!("Invalid logging settings: {}", e)))?;
        let values = serde_json::to_value(table)
            .map_err(|e| KernelError::Other(format!("Invalid logging settings: {}", e)))?;
        let overrides: ConfigData = serde_json::from_value(values)
            .map_err(|e| KernelError::Other(format!("Invalid logging settings: {}", e)))?;
        Ok(Self::default().with_overrides(&overrides))
    }
}

/// Installs the global subscriber. Fails if a logger or subscriber is
/// already installed in this process.
pub fn install(settings: &LogSettings) -> KernelResult<()> {
    tracing_log::LogTracer::init()
        .map_err(|e| KernelError::Other(format!("Failed to bridge log records: {}", e)))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match settings.format {
        LogFormat::Plain => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };
    installed.map_err(|e| KernelError::Other(format!("Failed to install tracing subscriber: {}", e)))
}

/// The object registered under [`LOGGING_API`]
#[derive(Debug, Default)]
pub struct LogApi;

impl LogApi {
    /// Logs `message` at `level` (case insensitive `error`..`trace`)
    pub fn log(&self, level: &str, message: &str) -> Result<(), String> {
        let level = log::Level::from_str(level).map_err(|_| format!("Unknown log level '{}'", level))?;
        log::log!(target: "plugin", level, "{}", message);
        Ok(())
    }
}

pub struct LoggingPlugin {
    settings: LogSettings,
    installed: AtomicBool,
}

impl LoggingPlugin {
    pub fn new(settings: LogSettings) -> Self {
        Self {
            settings,
            installed: AtomicBool::new(false),
        }
    }

    /// Whether this plugin installed the process-wide backend
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }
}

impl Default for LoggingPlugin {
    fn default() -> Self {
        Self::new(LogSettings::default())
    }
}

impl Plugin for LoggingPlugin {
    fn name(&self) -> &'static str {
        LOGGING_API
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        const COMPATIBLE_API_REQ: &str = "^0.1";
        match VersionRange::from_constraint(COMPATIBLE_API_REQ) {
            Ok(vr) => vec![vr],
            Err(e) => {
                log::error!(
                    "Failed to parse API version requirement ('{}') for {}: {}",
                    COMPATIBLE_API_REQ,
                    self.name(),
                    e
                );
                vec![]
            }
        }
    }

    fn init(&self, ctx: &PluginContext) -> KernelResult<()> {
        let settings = self.settings.with_overrides(ctx.config());
        match install(&settings) {
            Ok(()) => {
                self.installed.store(true, Ordering::SeqCst);
                log::info!("Logging initialized at '{}' ({:?})", settings.level, settings.format);
            }
            // Another backend is already in place; keep using it
            Err(e) => log::warn!("Keeping existing logging backend: {}", e),
        }
        Ok(())
    }

    fn register_apis(&self, ctx: &PluginContext) -> KernelResult<()> {
        let provider = Provider::new(LogApi).try_method(
            "Log",
            |api: &LogApi, (level, message): (String, String)| api.log(&level, &message),
        );
        ctx.registry().register(LOGGING_API, provider)?;
        Ok(())
    }

    fn shutdown(&self) -> KernelResult<()> {
        log::info!("Shutting down Core Logging Plugin");
        Ok(())
    }
}
