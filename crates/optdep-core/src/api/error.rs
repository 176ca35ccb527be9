//! # API Broker Errors
//!
//! Error types produced by the API broker.
//!
//! [`ApiError`] covers misuse of the registry itself. [`InvokeError`] describes
//! why a name-based call on a provider did not go through, and
//! [`CallbackError`] wraps whatever a subscriber callback produced when it
//! failed. None of these is ever fatal to the registry.
use thiserror::Error;

/// Boxed error accepted from callbacks and fallible provider methods.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API name must not be empty")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Method '{method}' is not exposed by the provider")]
    MissingMethod { method: String },

    #[error("Method '{method}' takes {expected} argument(s), {found} given")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("Argument {index} of method '{method}' must be of type '{expected}'")]
    ArgumentType {
        method: String,
        index: usize,
        expected: &'static str,
    },

    #[error("Method '{method}' failed: {source}")]
    Failed {
        method: String,
        #[source]
        source: BoxError,
    },

    #[error("Method '{method}' panicked: {message}")]
    Panicked { method: String, message: String },
}

impl InvokeError {
    /// Name of the method the failed call targeted.
    pub fn method(&self) -> &str {
        match self {
            InvokeError::MissingMethod { method }
            | InvokeError::ArgumentCount { method, .. }
            | InvokeError::ArgumentType { method, .. }
            | InvokeError::Failed { method, .. }
            | InvokeError::Panicked { method, .. } => method,
        }
    }
}

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("callback returned an error: {0}")]
    Failed(#[source] BoxError),

    #[error("callback panicked: {0}")]
    Panicked(String),
}

/// Turns a `catch_unwind` payload into something printable.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
