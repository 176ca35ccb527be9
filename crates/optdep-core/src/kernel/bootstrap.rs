use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{ApiRegistry, LogReporter};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::{ApiVersion, Plugin, PluginHost, StartupReport};
use crate::storage::{BrokerConfig, ConfigFormat, ConfigManager, LocalStorageProvider, StorageProvider};

/// Root object of the broker application
///
/// Owns the configuration layer, the shared [`ApiRegistry`] and the
/// [`PluginHost`]. Plugins are added with [`register_plugin`] before
/// [`run`] starts them.
///
/// [`register_plugin`]: Application::register_plugin
/// [`run`]: Application::run
pub struct Application {
    config_dir: PathBuf,
    config_manager: Arc<ConfigManager>,
    broker_config: BrokerConfig,
    registry: Arc<ApiRegistry>,
    host: PluginHost,
    startup: Option<StartupReport>,
}

impl Application {
    /// Creates an application reading its configuration from `config_dir`.
    /// Missing configuration files fall back to defaults.
    pub fn new(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        log::info!("Using config directory: {}", config_dir.display());

        let provider = Arc::new(LocalStorageProvider::new(config_dir.clone())) as Arc<dyn StorageProvider>;
        let config_manager = Arc::new(ConfigManager::new(
            provider,
            PathBuf::new(),
            PathBuf::from(constants::PLUGIN_CONFIG_DIR),
            ConfigFormat::Json,
        ));
        let broker_config = BrokerConfig::load(&config_manager, constants::APP_CONFIG_NAME)?;
        log::debug!("Broker configuration: {:?}", broker_config);

        let registry = Arc::new(ApiRegistry::with_reporter(LogReporter::new(
            broker_config.report_replay_failures,
        )));
        let api_version: ApiVersion = constants::API_VERSION.parse().map_err(|e| {
            Error::from(crate::plugin_system::PluginSystemError::VersionParsing(e))
        })?;
        let host = PluginHost::new(api_version, Arc::clone(&registry))
            .with_config_manager(Arc::clone(&config_manager));

        Ok(Application {
            config_dir,
            config_manager,
            broker_config,
            registry,
            host,
            startup: None,
        })
    }

    /// Adds a statically linked plugin
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.host.register_plugin(plugin)
    }

    /// Starts every registered plugin. See [`PluginHost::start`].
    pub fn run(&mut self) -> Result<&StartupReport> {
        let report = self.host.start()?;
        if report.is_clean() {
            log::info!("Application started successfully.");
        } else {
            log::warn!("Application started with {} plugin failures.", report.failures.len());
        }
        Ok(self.startup.insert(report))
    }

    /// Shuts plugins down in reverse registration order
    pub fn shutdown(&mut self) -> Result<()> {
        log::info!("Shutting down {}", constants::APP_NAME);
        self.host.shutdown()
    }

    /// Returns whether [`run`](Application::run) has been called
    pub fn is_initialized(&self) -> bool {
        self.host.is_started()
    }

    pub fn registry(&self) -> &Arc<ApiRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.broker_config
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.config_manager
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn plugin_host(&self) -> &PluginHost {
        &self.host
    }

    /// Report of the last [`run`](Application::run), if any
    pub fn startup_report(&self) -> Option<&StartupReport> {
        self.startup.as_ref()
    }
}
