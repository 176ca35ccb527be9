use std::path::PathBuf;

use clap::{Parser, Subcommand};
use optdep_core::api::{ApiRegistry, InvokeError};
use optdep_core::kernel::constants;
use optdep_core::plugin_system::StartupReport;
use optdep_core::storage::{BrokerConfig, ConfigManager, ConfigScope, PluginConfigScope};

/// optdep: optional dependencies between plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Print "pong" and exit without starting plugins
    #[arg(long)]
    pub ping: bool,

    /// Directory holding optdep.{json,toml,yaml} and plugin configuration
    #[arg(long, value_name = "DIR", default_value = constants::DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered APIs with their providers and method signatures
    List,
    /// Call a method on every provider of an API
    Invoke {
        /// API name, e.g. IpsumClass
        api: String,
        /// Method name, e.g. IpsumMethod
        method: String,
        /// Arguments, each passed as a String
        args: Vec<String>,
    },
    /// List configuration files and their keys
    Config {
        /// Write the current application settings to optdep.json if no
        /// application config exists yet
        #[arg(long)]
        init: bool,
    },
}

pub fn print_startup_summary(report: &StartupReport, registry: &ApiRegistry) {
    println!(
        "Started {} plugins, {} completed API registration.",
        report.initialized.len(),
        report.registered.len()
    );
    for failure in &report.failures {
        println!("  ! {}", failure);
    }
    for name in registry.api_names() {
        println!(
            "  - {}: {} provider(s), {} subscriber(s)",
            name,
            registry.provider_count(&name),
            registry.subscriber_count(&name)
        );
    }
}

pub fn print_api_list(registry: &ApiRegistry) {
    let names = registry.api_names();
    if names.is_empty() {
        println!("No APIs registered.");
        return;
    }
    for name in names {
        println!("{}", name);
        for provider in registry.providers(&name) {
            println!("  provider {}", provider.type_name());
            for (method, signature) in provider.signatures() {
                println!("    {}: {} ({} args)", method, signature, signature.arity());
            }
        }
    }
}

/// Broadcasts `method` with string arguments. Returns whether at least one
/// provider ran it successfully.
pub fn invoke(registry: &ApiRegistry, api: &str, method: &str, args: &[String]) -> bool {
    if !registry.has_api(api) {
        println!("No provider registered for '{}'.", api);
        return false;
    }

    let erased: Vec<&dyn std::any::Any> = args.iter().map(|arg| arg as &dyn std::any::Any).collect();
    let results = registry.invoke_all(api, method, &erased);
    for (provider, result) in registry.providers(api).iter().zip(&results) {
        match result {
            Ok(()) => println!("{} on {}: ok", method, provider.type_name()),
            Err(InvokeError::MissingMethod { .. }) => {
                println!("{} on {}: not provided", method, provider.type_name())
            }
            Err(e) => println!("{} on {}: {}", method, provider.type_name(), e),
        }
    }
    results.iter().any(Result::is_ok)
}

/// Prints every configuration file by scope. With `init`, first writes
/// `settings` as the application config when none exists.
pub fn show_config(manager: &ConfigManager, settings: &BrokerConfig, init: bool) -> bool {
    if init {
        let path = manager.resolve_config_path(constants::APP_CONFIG_NAME, ConfigScope::Application);
        match manager.list_configs(ConfigScope::Application) {
            Ok(names) if names.iter().any(|name| name == constants::APP_CONFIG_NAME) => {
                println!("Application config already exists, leaving it untouched.");
            }
            Ok(_) => match settings.save(manager, constants::APP_CONFIG_NAME) {
                Ok(()) => println!("Wrote {}", path.display()),
                Err(e) => {
                    println!("Failed to write {}: {}", path.display(), e);
                    return false;
                }
            },
            Err(e) => {
                println!("Failed to read configuration directory: {}", e);
                return false;
            }
        }
    }

    let scopes = [
        ("application", ConfigScope::Application),
        ("plugin defaults", ConfigScope::Plugin(PluginConfigScope::Default)),
        ("plugin user", ConfigScope::Plugin(PluginConfigScope::User)),
    ];
    let mut ok = true;
    for (label, scope) in scopes {
        let names = match manager.list_configs(scope) {
            Ok(names) => names,
            Err(e) => {
                println!("{}: {}", label, e);
                ok = false;
                continue;
            }
        };
        println!("{} ({})", label, names.len());
        for name in names {
            match manager.load_config(&name, scope) {
                Ok(config) => {
                    let mut keys = config.keys();
                    keys.sort();
                    println!("  {}: {}", name, keys.join(", "));
                }
                Err(e) => {
                    println!("  {}: {}", name, e);
                    ok = false;
                }
            }
        }
    }
    ok
}
