//! CLI error handling with user-friendly messages.

use std::fmt;
use std::process;

use mapconverter::config::ConfigFileError;
use mapconverter::PipelineError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Async runtime could not be started
    Runtime(std::io::Error),
    /// Rendering failed
    Pipeline(PipelineError),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
    /// Failed to encode the JSON document
    Json(serde_json::Error),
    /// HTTP server could not bind or stopped with an error
    Serve { addr: String, error: std::io::Error },
    CacheClear(std::io::Error),
    CacheStats(std::io::Error),
}

impl CliError {
    /// Print the error and exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Serve { .. } => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Port already in use: choose another with --port");
                eprintln!("  2. Ports below 1024 need elevated privileges");
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Check the file passed with --config (default ~/.mapconverter/config.ini)");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Pipeline(e) => write!(f, "Failed to render map: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Json(e) => write!(f, "Failed to encode JSON: {}", e),
            CliError::Serve { addr, error } => write!(f, "HTTP server error on {}: {}", addr, error),
            CliError::CacheClear(e) => write!(f, "Failed to clear cache: {}", e),
            CliError::CacheStats(e) => write!(f, "Failed to read cache statistics: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Json(e) => Some(e),
            CliError::Serve { error, .. } => Some(error),
            CliError::CacheClear(e) | CliError::CacheStats(e) => Some(e),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_and_source() {
        let err = CliError::FileWrite {
            path: "out.png".to_string(),
            error: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to write file 'out.png': denied");
        assert!(err.source().is_some());
        assert!(CliError::LoggingInit("x".into()).source().is_none());
    }

    #[test]
    fn test_pipeline_conversion() {
        let err: CliError = PipelineError::InvalidInput("lat is required".into()).into();
        assert_eq!(err.to_string(), "Failed to render map: Invalid input: lat is required");
    }
}
