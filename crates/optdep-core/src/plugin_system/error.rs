//! # Plugin System Errors
//!
//! [`PluginSystemError`] covers plugin registration with the host and failures
//! raised by a plugin during either startup phase or shutdown.
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin '{plugin_id}' is already registered")]
    DuplicatePlugin { plugin_id: String },

    #[error("Plugin '{plugin_id}' is not compatible with API version {api_version} (accepts: {accepted})")]
    IncompatibleApiVersion {
        plugin_id: String,
        api_version: String,
        accepted: String,
    },

    #[error("Plugin initialization error for '{plugin_id}': {message}")]
    InitializationError { plugin_id: String, message: String },

    #[error("Plugin API registration error for '{plugin_id}': {message}")]
    RegistrationError { plugin_id: String, message: String },

    #[error("Plugin shutdown error for '{plugin_id}': {message}")]
    ShutdownError { plugin_id: String, message: String },

    #[error("Plugin host has already been started")]
    AlreadyStarted,

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}

impl PluginSystemError {
    /// Name of the plugin the error concerns, if any
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            PluginSystemError::DuplicatePlugin { plugin_id }
            | PluginSystemError::IncompatibleApiVersion { plugin_id, .. }
            | PluginSystemError::InitializationError { plugin_id, .. }
            | PluginSystemError::RegistrationError { plugin_id, .. }
            | PluginSystemError::ShutdownError { plugin_id, .. } => Some(plugin_id),
            PluginSystemError::AlreadyStarted | PluginSystemError::VersionParsing(_) => None,
        }
    }
}
