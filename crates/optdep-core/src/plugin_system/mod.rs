//! # Plugin System
//!
//! Statically registered plugins and the host that starts them.
//!
//! - **[`traits`]**: the [`Plugin`] trait and the [`PluginContext`] handed to
//!   each plugin.
//! - **[`host`]**: [`PluginHost`], which checks API compatibility, runs the
//!   two startup phases and shuts plugins down in reverse order.
//! - **[`version`]**: [`ApiVersion`] and semver-backed [`VersionRange`].
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod error;
pub mod host;
pub mod traits;
pub mod version;

pub use error::PluginSystemError;
pub use host::{PluginHost, StartupReport};
pub use traits::{Plugin, PluginContext};
pub use version::{ApiVersion, VersionRange};

#[cfg(test)]
mod tests;
