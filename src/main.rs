use clap::Parser;

use sheetstamp::cli::commands::{run_config, run_init, run_watch};
use sheetstamp::cli::{Cli, Commands};
use sheetstamp::config::Settings;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Init creates the configuration; every other command expects it.
    if !matches!(cli.command, Commands::Init { .. }) {
        if let Err(warning) = Settings::check_init() {
            eprintln!("Warning: {warning}");
            eprintln!("Run 'sheetstamp init' to create a configuration file.\n");
        }
    }

    let config = match &cli.config {
        Some(path) => match Settings::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Cannot load configuration from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        // A missing settings file still loads as defaults; a settings
        // file that exists but cannot be parsed is a startup failure.
        None => match Settings::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                std::process::exit(1);
            }
        },
    };

    sheetstamp::logging::init_with_config(&config.logging);

    match cli.command {
        Commands::Init { force } => run_init(force),
        Commands::Watch { root } => run_watch(&config, root).await,
        Commands::Config => run_config(&config),
    }
}
