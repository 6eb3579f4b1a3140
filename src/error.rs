use crate::api::RestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
    #[error("SimulationError: {0}")]
    Simulation(#[from] SimulationError),
    #[error("ServerError: {0}")]
    Server(#[from] ServerError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Unknown configuration field: {field}")]
    UnknownField { field: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {value}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Failure while encoding or decoding a wire body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("XML error: {0}")]
    Xml(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

/// An uploaded workbook or data source file could not be rewritten.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildResponseError {
    #[error("Uploaded file '{file_name}' is not valid XML: {message}")]
    MalformedFile { file_name: String, message: String },
    #[error("Uploaded file '{file_name}' is not UTF-8 text")]
    NotText { file_name: String },
}

impl From<BuildResponseError> for RestError {
    fn from(error: BuildResponseError) -> Self {
        RestError::new(400, 0, "Bad Request", error.to_string())
    }
}

/// Outcome of a simulated request that is not a plain response.
///
/// [`SimulationError::Rest`] is recovered into an error envelope by the
/// dispatcher; the other variants reach the caller.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("{0}")]
    Rest(#[from] RestError),
    #[error("Operation {operation} requires a signed-in session but none exists")]
    SessionRequired { operation: String },
    #[error("Response serialization failed: {0}")]
    Serialization(#[from] SerializationError),
}

impl From<BuildResponseError> for SimulationError {
    fn from(error: BuildResponseError) -> Self {
        SimulationError::Rest(error.into())
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl ErrorSeverity {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorSeverity::Critical => "🚨",
            ErrorSeverity::High => "❌",
            ErrorSeverity::Medium => "⚠️",
            ErrorSeverity::Low => "ℹ️",
        }
    }
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Storage(_) => ErrorSeverity::Medium,
            AppError::Simulation(simulation_error) => match simulation_error {
                SimulationError::SessionRequired { .. } => ErrorSeverity::Critical,
                SimulationError::Rest(rest) if rest.status >= 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Low,
            },
            AppError::Server(_) => ErrorSeverity::Critical,
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Config(ConfigError::InvalidValue { reason, .. }) => Some(format!(
                "{}; change it with 'tableau-sim config set <field> <value>'",
                reason
            )),
            AppError::Storage(StorageError::ConfigParseError { .. }) => {
                Some("Fix or remove config.toml in the configuration directory".to_string())
            }
            AppError::Cli(CliError::UnknownField { .. }) => {
                Some("'tableau-sim config show' to list the configuration fields".to_string())
            }
            AppError::Server(ServerError::Bind { .. }) => {
                Some("Choose another port with 'tableau-sim serve --port <port>'".to_string())
            }
            AppError::Simulation(SimulationError::SessionRequired { .. }) => Some(
                "Sign in through the simulator before calling operations that need a session"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let cli_err = CliError::InvalidArguments("invalid arguments".to_string());
        assert_eq!(
            format!("{}", cli_err),
            "Invalid arguments: invalid arguments"
        );
    }

    #[test]
    fn test_config_error_display() {
        let config_err = ConfigError::InvalidValue {
            field: "max_page_size".to_string(),
            value: "zero".to_string(),
            reason: "must be a positive integer".to_string(),
        };
        assert_eq!(
            format!("{}", config_err),
            "Invalid configuration value for 'max_page_size': zero"
        );
    }

    #[test]
    fn test_build_response_error_becomes_bad_request() {
        let error = BuildResponseError::NotText {
            file_name: "sales.twb".to_string(),
        };
        let rest: RestError = error.into();
        assert_eq!(rest.status, 400);
        assert_eq!(rest.code(), "400000");
        assert!(rest.detail.contains("sales.twb"));
    }

    #[test]
    fn test_app_error_severity() {
        let app_err = AppError::Simulation(SimulationError::SessionRequired {
            operation: "CreateProject".to_string(),
        });
        assert_eq!(app_err.severity(), ErrorSeverity::Critical);
        assert!(app_err.troubleshooting_hint().is_some());

        let app_err = AppError::Simulation(SimulationError::Rest(RestError::new(
            404, 2, "Not Found", "",
        )));
        assert_eq!(app_err.severity(), ErrorSeverity::Low);
        assert!(app_err.troubleshooting_hint().is_none());

        let app_err = AppError::Cli(CliError::InvalidArguments("x".to_string()));
        assert_eq!(
            format!("{}", app_err),
            "CliError: Invalid arguments: x"
        );
    }
}
