//! # Storage
//!
//! File-backed configuration for the broker application and its plugins.
//!
//! [`StorageProvider`] abstracts the filesystem, [`LocalStorageProvider`] is
//! the on-disk implementation, and [`ConfigManager`] layers format detection,
//! caching and default/user scoping for plugin configuration on top.
pub mod config;
pub mod error;
pub mod local;
pub mod provider;

pub use config::{
    BrokerConfig, ConfigData, ConfigFormat, ConfigManager, ConfigScope, LogFormat,
    PluginConfigScope,
};
pub use error::StorageSystemError;
pub use local::LocalStorageProvider;
pub use provider::StorageProvider;
