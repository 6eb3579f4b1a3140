use clap::Parser;
use std::path::PathBuf;
use tableau_sim::cli::dispatcher::Dispatcher;
use tableau_sim::cli::main_types::Cli;
use tableau_sim::storage::config::SimulatorConfig;
use tableau_sim::utils::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load Config
    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| PathBuf::from(dir).join("config.toml"));

    let config = match SimulatorConfig::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    if cli.verbose {
        println!("Verbose mode is enabled");

        if let Some(config_dir) = &cli.config_dir {
            println!("Using config directory: {}", config_dir);
        }
    }

    let dispatcher = Dispatcher::new(config, config_path, cli.verbose);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        eprintln!("{} Error: {}", e.severity().emoji(), e);
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("   Hint: {}", hint);
        }
        std::process::exit(1);
    }

    Ok(())
}
