use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tableau-sim")]
#[command(about = "In-memory simulated Tableau REST API server for testing migration clients")]
#[command(version)]
#[command(after_help = "Examples:
  tableau-sim serve                     # Seeded server on port 8080
  tableau-sim serve --port 0 --empty    # Empty server on a random port
  tableau-sim routes                    # List the simulated operations
  tableau-sim routes --format json      # Route table as JSON
  tableau-sim config show               # Show current configuration
  tableau-sim config set enforce_auth false

Environment Variables:
  TABSIM_API_VERSION   REST API version to simulate (overrides config.toml)
  RUST_LOG             Log filter, e.g. tableau_sim=debug")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a simulated server until interrupted
    Serve(ServeArgs),
    /// List the route table of the simulated API
    Routes {
        /// Output format: table or json
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Configuration management (show, set)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (0 picks a free port)
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Start without demo content
    #[arg(long)]
    pub empty: bool,

    /// Accept requests without an X-Tableau-Auth token
    #[arg(long)]
    pub no_auth: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set one configuration field
    #[command(after_help = "Examples:
  tableau-sim config set api_version 3.21
  tableau-sim config set site_content_url marketing
  tableau-sim config set max_page_size 500")]
    Set {
        /// Field name (see 'config show')
        field: String,
        /// New value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_serve() {
        let cli = Cli::try_parse_from(["tableau-sim", "serve", "--port", "9000", "--empty"])
            .expect("parse");
        assert!(!cli.verbose);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, 9000);
                assert!(args.empty);
                assert!(!args.no_auth);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_set() {
        let cli = Cli::try_parse_from([
            "tableau-sim",
            "--verbose",
            "config",
            "set",
            "site_name",
            "Marketing",
        ])
        .expect("parse");
        assert!(cli.verbose);
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Set { field, value },
            } => {
                assert_eq!(field, "site_name");
                assert_eq!(value, "Marketing");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_cli_parsing_routes_default_format() {
        let cli = Cli::try_parse_from(["tableau-sim", "routes"]).expect("parse");
        match cli.command {
            Commands::Routes { format } => assert_eq!(format, "table"),
            _ => panic!("Expected Routes command"),
        }
    }

    #[test]
    fn test_cli_parsing_rejects_missing_value() {
        assert!(Cli::try_parse_from(["tableau-sim", "config", "set", "site_name"]).is_err());
    }
}
