mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::error;
use optdep_core::kernel::bootstrap::Application;
use optdep_core::plugin_system::Plugin;

// --- Statically linked plugins ---
use core_logging::{LogSettings, LoggingPlugin};
use ipsum_consumer::IpsumConsumerPlugin;
use ipsum_provider::IpsumProviderPlugin;

use cli::{CliArgs, Commands};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    println!("Initializing application...");
    let mut app = match Application::new(args.config_dir.clone()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let plugins: Vec<Arc<dyn Plugin>> = vec![
        Arc::new(LoggingPlugin::new(LogSettings::from(app.config()))),
        Arc::new(IpsumConsumerPlugin::default()),
        Arc::new(IpsumProviderPlugin::default()),
    ];
    for plugin in plugins {
        let name = plugin.name();
        if let Err(e) = app.register_plugin(plugin) {
            eprintln!("Fatal: Failed to register {} plugin: {}", name, e);
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = app.run() {
        eprintln!("Application error: {}", e);
        return ExitCode::FAILURE;
    }
    let startup_clean = app.startup_report().is_some_and(|report| report.is_clean());
    if let (None, Some(report)) = (&args.command, app.startup_report()) {
        cli::print_startup_summary(report, app.registry());
    }

    let succeeded = match &args.command {
        Some(Commands::List) => {
            cli::print_api_list(app.registry());
            true
        }
        Some(Commands::Invoke { api, method, args }) => cli::invoke(app.registry(), api, method, args),
        Some(Commands::Config { init }) => cli::show_config(app.config_manager(), app.config(), *init),
        None => startup_clean,
    };

    println!("Shutting down application...");
    if let Err(e) = app.shutdown() {
        error!("Shutdown error: {}", e);
    }

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
