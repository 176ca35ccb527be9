use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::api::error::panic_message;
use crate::api::ApiRegistry;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{Plugin, PluginContext};
use crate::plugin_system::version::ApiVersion;
use crate::storage::{ConfigData, ConfigManager};

/// Outcome of [`PluginHost::start`]
#[derive(Debug, Default)]
pub struct StartupReport {
    /// Plugins whose phase 1 succeeded, in start order
    pub initialized: Vec<String>,
    /// Plugins whose phase 2 succeeded, in start order
    pub registered: Vec<String>,
    /// Every plugin failure from either phase
    pub failures: Vec<PluginSystemError>,
}

impl StartupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct HostedPlugin {
    plugin: Arc<dyn Plugin>,
    context: Option<PluginContext>,
}

/// Owns the statically registered plugins and drives their two-phase startup
pub struct PluginHost {
    plugins: Vec<HostedPlugin>,
    registry: Arc<ApiRegistry>,
    config_manager: Option<Arc<ConfigManager>>,
    api_version: ApiVersion,
    started: bool,
    shut_down: bool,
}

impl PluginHost {
    pub fn new(api_version: ApiVersion, registry: Arc<ApiRegistry>) -> Self {
        Self {
            plugins: Vec::new(),
            registry,
            config_manager: None,
            api_version,
            started: false,
            shut_down: false,
        }
    }

    /// Plugins get their configuration from `manager` instead of an empty one
    pub fn with_config_manager(mut self, manager: Arc<ConfigManager>) -> Self {
        self.config_manager = Some(manager);
        self
    }

    pub fn registry(&self) -> &Arc<ApiRegistry> {
        &self.registry
    }

    pub fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Add a plugin. Names must be unique and the plugin must accept the
    /// host's API version.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name();
        if self.has_plugin(name) {
            return Err(PluginSystemError::DuplicatePlugin { plugin_id: name.to_string() }.into());
        }

        let ranges = plugin.compatible_api_versions();
        if !ranges.iter().any(|range| range.includes_api(&self.api_version)) {
            let accepted = ranges.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
            return Err(PluginSystemError::IncompatibleApiVersion {
                plugin_id: name.to_string(),
                api_version: self.api_version.to_string(),
                accepted,
            }
            .into());
        }

        log::debug!("Registered plugin {} v{}", name, plugin.version());
        self.plugins.push(HostedPlugin { plugin, context: None });
        Ok(())
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|hosted| hosted.plugin.name() == name)
    }

    /// Plugin names in registration order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|hosted| hosted.plugin.name()).collect()
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn plugin_config(&self, name: &str) -> ConfigData {
        match &self.config_manager {
            Some(manager) => manager.get_plugin_config(name).unwrap_or_else(|e| {
                log::warn!("Failed to load configuration for plugin {}: {}", name, e);
                ConfigData::new()
            }),
            None => ConfigData::new(),
        }
    }

    /// Run phase 1 for every plugin, then phase 2 for every plugin whose
    /// phase 1 succeeded. Failing plugins are logged and recorded in the
    /// report; they never stop the others.
    pub fn start(&mut self) -> Result<StartupReport> {
        if self.started {
            return Err(PluginSystemError::AlreadyStarted.into());
        }
        self.started = true;

        let mut report = StartupReport::default();

        log::info!("Initializing {} plugins", self.plugins.len());
        for index in 0..self.plugins.len() {
            let name = self.plugins[index].plugin.name();
            let context = PluginContext::new(name, Arc::clone(&self.registry), self.plugin_config(name));
            let hosted = &mut self.plugins[index];

            match run_guarded(|| hosted.plugin.init(&context)) {
                Ok(()) => {
                    log::info!("Initialized plugin: {}", name);
                    hosted.context = Some(context);
                    report.initialized.push(name.to_string());
                }
                Err(message) => {
                    log::error!("Failed to initialize plugin {}: {}", name, message);
                    report.failures.push(PluginSystemError::InitializationError {
                        plugin_id: name.to_string(),
                        message,
                    });
                }
            }
        }

        log::info!("Registering plugin APIs");
        for hosted in &self.plugins {
            let Some(context) = &hosted.context else {
                continue;
            };
            let name = hosted.plugin.name();
            match run_guarded(|| hosted.plugin.register_apis(context)) {
                Ok(()) => {
                    log::debug!("Plugin {} registered its APIs", name);
                    report.registered.push(name.to_string());
                }
                Err(message) => {
                    log::error!("Plugin {} failed to register its APIs: {}", name, message);
                    report.failures.push(PluginSystemError::RegistrationError {
                        plugin_id: name.to_string(),
                        message,
                    });
                }
            }
        }

        log::info!(
            "Plugin startup complete: {} initialized, {} registered, {} failures",
            report.initialized.len(),
            report.registered.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Shut down initialized plugins in reverse registration order. Every
    /// plugin is attempted; the first failure is returned.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.started || self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        let mut first_error = None;
        for hosted in self.plugins.iter_mut().rev() {
            if hosted.context.take().is_none() {
                continue;
            }
            let name = hosted.plugin.name();
            log::info!("Shutting down plugin: {}", name);
            if let Err(message) = run_guarded(|| hosted.plugin.shutdown()) {
                log::error!("Error shutting down plugin {}: {}", name, message);
                first_error.get_or_insert(PluginSystemError::ShutdownError {
                    plugin_id: name.to_string(),
                    message,
                });
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl Drop for PluginHost {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("Plugin shutdown on drop reported an error: {}", e);
        }
    }
}

/// Runs a plugin entry point, turning both errors and panics into a message
fn run_guarded(entry: impl FnOnce() -> Result<()>) -> std::result::Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(entry)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(Error::Other(message))) => Err(message),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}
