//! # Kernel Errors
//!
//! [`Error`] is the crate-wide error type. Each subsystem keeps its own typed
//! error enum and converts into this one with `?`.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::api::error::{ApiError, InvokeError};
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

/// Top-level error for the broker application
#[derive(Debug, ThisError)]
pub enum Error {
    /// Registry rejected a registration or subscription
    #[error("API registry error: {0}")]
    ApiRegistry(#[from] ApiError),

    /// Invoking a provider method failed
    #[error("API invocation error: {0}")]
    Invoke(#[from] InvokeError),

    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
