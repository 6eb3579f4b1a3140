use crate::cli::command_handlers::{ConfigHandler, RoutesHandler, ServeHandler};
use crate::cli::main_types::Commands;
use crate::error::AppError;
use crate::storage::config::SimulatorConfig;
use crate::utils::logging::print_verbose;
use std::path::PathBuf;

pub struct Dispatcher {
    config: SimulatorConfig,
    config_path: Option<PathBuf>,
    verbose: bool,
}

impl Dispatcher {
    fn log_verbose(&self, msg: &str) {
        print_verbose(self.verbose, msg);
    }

    pub fn new(config: SimulatorConfig, config_path: Option<PathBuf>, verbose: bool) -> Self {
        Self {
            config,
            config_path,
            verbose,
        }
    }

    // File configuration with environment overrides applied
    fn effective_config(&self) -> SimulatorConfig {
        self.config.clone().with_env_overrides()
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Serve(args) => {
                self.log_verbose(&format!("Serving with {:?}", args));
                ServeHandler::new()
                    .handle(args, self.effective_config(), self.verbose)
                    .await
            }
            Commands::Routes { format } => RoutesHandler::new().handle(&format, &self.effective_config()),
            Commands::Config { command } => {
                // saved without environment overrides
                let mut config = self.config.clone();
                ConfigHandler::new().handle(
                    command,
                    &mut config,
                    self.config_path.clone(),
                    self.verbose,
                )
            }
        }
    }
}
