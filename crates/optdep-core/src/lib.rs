//! # optdep-core
//!
//! Optional dependencies between statically linked plugins.
//!
//! Plugins publish provider objects into a shared [`ApiRegistry`] under
//! agreed names and subscribe to the names they can make use of. Neither side
//! needs the other at compile time, and either may be absent at runtime.
//!
//! - [`api`]: the registry, access handles and provider builder.
//! - [`plugin_system`]: the [`Plugin`] trait and the two-phase [`PluginHost`].
//! - [`kernel`]: [`Application`] bootstrap, constants, the unified error type.
//! - [`storage`]: JSON/TOML/YAML configuration for the app and its plugins.
pub mod api;
pub mod kernel;
pub mod plugin_system;
pub mod storage;

pub use api::{ApiAccess, ApiRegistry, Provider};
pub use kernel::Application;
pub use kernel::error::{Error as KernelError, Result};
pub use plugin_system::{Plugin, PluginContext, PluginHost, VersionRange};
pub use storage::{BrokerConfig, ConfigData, StorageProvider};

#[cfg(test)]
mod tests;
