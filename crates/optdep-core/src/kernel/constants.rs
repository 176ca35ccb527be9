/// Application name
pub const APP_NAME: &str = "optdep";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the plugin-facing API. Plugins declare the range they accept.
pub const API_VERSION: &str = "0.1.0";

/// Name of the application configuration file, without extension
pub const APP_CONFIG_NAME: &str = "optdep";

/// Default configuration directory, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Plugin configuration directory, relative to the configuration directory
pub const PLUGIN_CONFIG_DIR: &str = "plugins";
