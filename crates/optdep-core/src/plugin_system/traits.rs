use std::fmt;
use std::sync::Arc;

use crate::api::ApiRegistry;
use crate::kernel::error::Result;
use crate::plugin_system::version::VersionRange;
use crate::storage::ConfigData;

/// Everything a plugin is handed during startup
#[derive(Clone)]
pub struct PluginContext {
    plugin_name: String,
    registry: Arc<ApiRegistry>,
    config: ConfigData,
}

impl PluginContext {
    pub fn new(plugin_name: impl Into<String>, registry: Arc<ApiRegistry>, config: ConfigData) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            registry,
            config,
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// The shared API registry
    pub fn registry(&self) -> &Arc<ApiRegistry> {
        &self.registry
    }

    /// Plugin configuration, user values merged over defaults
    pub fn config(&self) -> &ConfigData {
        &self.config
    }
}

impl fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin_name", &self.plugin_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Core trait that all plugins must implement
///
/// Startup happens in two phases. [`init`](Plugin::init) runs for every
/// plugin first and is where consumers subscribe to the APIs they can use.
/// [`register_apis`](Plugin::register_apis) runs afterwards, once per plugin,
/// and is where providers publish their APIs. Because every subscription
/// exists before the first registration, each consumer is notified through
/// the registration path no matter in which order plugins were added.
pub trait Plugin: Send + Sync {
    /// The name of the plugin
    fn name(&self) -> &'static str;

    /// The version of the plugin
    fn version(&self) -> &str;

    /// API versions this plugin can run against
    fn compatible_api_versions(&self) -> Vec<VersionRange>;

    /// Phase 1: local initialization
    fn init(&self, ctx: &PluginContext) -> Result<()>;

    /// Phase 2: publish APIs into the registry
    fn register_apis(&self, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// Shutdown the plugin
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
