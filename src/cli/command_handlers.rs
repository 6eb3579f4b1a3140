use crate::cli::main_types::{ConfigCommands, ServeArgs};
use crate::core::routes::routes;
use crate::core::seed::{DEMO_ADMIN, seed_demo};
use crate::core::simulator::Simulator;
use crate::display::TableDisplay;
use crate::error::{AppError, CliError, ServerError};
use crate::server::SimulatedServer;
use crate::storage::config::SimulatorConfig;
use crate::utils::logging::print_verbose;
use crate::utils::validation::{
    validate_api_version, validate_config_field, validate_content_url,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Default)]
pub struct ServeHandler;

impl ServeHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: ServeArgs,
        mut config: SimulatorConfig,
        verbose: bool,
    ) -> Result<(), AppError> {
        if args.no_auth {
            config.enforce_auth = false;
        }
        let enforce_auth = config.enforce_auth;
        let simulator = Simulator::new(config);

        if args.empty {
            print_verbose(verbose, "Starting without demo content");
        } else {
            let summary = seed_demo(simulator.data());
            println!("Demo content:");
            println!("{}", TableDisplay::new().render_seed_summary(&summary));
        }

        let server = SimulatedServer::bind(args.port, simulator).await?;

        println!("✅ Simulated server running at {}", server.uri());
        println!("   Site: {}", server.site_uri());
        println!(
            "   Sign in: POST {}{}/auth/signin",
            server.uri(),
            server.simulator().api_path()
        );
        if !args.empty {
            println!("   Demo user: {} (any password)", DEMO_ADMIN);
        }
        if !enforce_auth {
            println!("   ⚠️  Authentication is not enforced");
        }
        println!("Press Ctrl-C to stop.");

        tokio::signal::ctrl_c().await.map_err(ServerError::Io)?;
        println!("\nStopping simulated server.");
        Ok(())
    }
}

#[derive(Default)]
pub struct RoutesHandler;

impl RoutesHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, format: &str, config: &SimulatorConfig) -> Result<(), AppError> {
        let prefix = format!("/api/{}/", config.api_version);
        match format.to_lowercase().as_str() {
            "json" => {
                let table: Vec<_> = routes()
                    .iter()
                    .map(|route| {
                        json!({
                            "operation": route.id.to_string(),
                            "method": route.method.as_str(),
                            "path": format!("{}{}", prefix, route.pattern),
                            "requiresAuth": route.requires_auth,
                        })
                    })
                    .collect();
                println!("{:#}", serde_json::Value::Array(table));
            }
            "table" => {
                println!("{}", TableDisplay::new().render_routes(routes(), &prefix));
                println!("{} operations", routes().len());
            }
            other => {
                return Err(AppError::Cli(CliError::InvalidArguments(format!(
                    "Unsupported format '{}'. Use table or json",
                    other
                ))));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(
        &self,
        command: ConfigCommands,
        config: &mut SimulatorConfig,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                print_verbose(verbose, "Attempting config show command");

                println!("Current Configuration:");
                println!("=====================");
                match config_path.clone().map_or_else(SimulatorConfig::config_file_path, Ok) {
                    Ok(path) => println!("File: {}", path.display()),
                    Err(_) => println!("File: (no configuration directory)"),
                }
                println!("{}", TableDisplay::new().render_config(config));

                let overridden = config.clone().with_env_overrides();
                if overridden.api_version != config.api_version {
                    println!(
                        "API version overridden by environment: {}",
                        overridden.api_version
                    );
                }
                Ok(())
            }
            ConfigCommands::Set { field, value } => {
                print_verbose(
                    verbose,
                    &format!("Attempting config set - field: {}, value: {}", field, value),
                );

                validate_config_field(&field)?;
                match field.as_str() {
                    "api_version" => validate_api_version(value.trim())?,
                    "site_content_url" => validate_content_url(value.trim())?,
                    _ => {}
                }
                if !config.set(&field, &value)? {
                    return Err(AppError::Cli(CliError::UnknownField { field }));
                }

                config.save(config_path)?;
                println!(
                    "✅ Set {} to: {}",
                    field,
                    config.get(&field).unwrap_or_default()
                );
                println!("Configuration saved successfully.");
                Ok(())
            }
        }
    }
}
