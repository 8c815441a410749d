//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and the exit code.

use std::fmt;
use std::process;

use layermerge::config::ConfigFileError;
use layermerge::crs::CrsError;
use layermerge::layer::LoadError;
use layermerge::pipeline::PipelineError;
use layermerge::preview::PreviewError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Missing or conflicting arguments
    Usage(String),
    /// A pipeline run failed
    Pipeline(PipelineError),
    /// A shapefile could not be read
    Load(LoadError),
    /// A CRS could not be understood
    Crs(CrsError),
    /// A preview could not be saved
    Preview(PreviewError),
}

impl CliError {
    /// Exit the process with an error message and status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Pipeline(PipelineError::Crs(CrsError::InvalidCrs { .. }))
            | CliError::Crs(CrsError::InvalidCrs { .. }) => {
                eprintln!();
                eprintln!("Run 'layermerge crs' to list common codes, or 'layermerge crs <CODE>' to check one.");
                eprintln!("PROJ strings (+proj=...) and WKT definitions are accepted too.");
            }
            CliError::Pipeline(PipelineError::Crs(CrsError::MissingTargetCrs)) => {
                eprintln!();
                eprintln!("Pass --crs or set target_crs in the [pipeline] section of config.ini.");
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
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Pipeline(e) => write!(f, "Pipeline failed: {}", e),
            CliError::Load(e) => write!(f, "{}", e),
            CliError::Crs(e) => write!(f, "{}", e),
            CliError::Preview(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pipeline(e) => Some(e),
            CliError::Load(e) => Some(e),
            CliError::Crs(e) => Some(e),
            CliError::Preview(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        CliError::Load(e)
    }
}

impl From<CrsError> for CliError {
    fn from(e: CrsError) -> Self {
        CliError::Crs(e)
    }
}

impl From<PreviewError> for CliError {
    fn from(e: PreviewError) -> Self {
        CliError::Preview(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_pipeline_errors() {
        let err = CliError::from(PipelineError::NoSources);
        assert_eq!(err.to_string(), "Pipeline failed: No source layers selected");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_usage_message_is_verbatim() {
        let err = CliError::Usage("no destination".to_string());
        assert_eq!(err.to_string(), "no destination");
    }
}
