//! CLI runner for common setup.
//!
//! Loads the config file, initializes logging and builds the orchestrator
//! for the commands that run the pipeline.

use std::path::Path;

use layermerge::config::{config_directory, ConfigFile};
use layermerge::logging::{init_logging, split_log_path, LoggingGuard};
use layermerge::pipeline::PipelineOrchestrator;
use layermerge::preview::{save_image, PreviewConfig};
use tracing::info;

use crate::error::CliError;

/// Runner that manages the CLI lifecycle.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let (log_dir, log_file) = split_log_path(&config.logging.file, &config_directory());
        let logging_guard = init_logging(&log_dir, &log_file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("layermerge v{}", layermerge::VERSION);
        info!("layermerge CLI: {} command", command);
    }

    /// Orchestrator with the preview settings resolved from config and flags.
    pub fn orchestrator(&self, preview: PreviewConfig) -> PipelineOrchestrator {
        PipelineOrchestrator::with_preview_config(preview)
    }

    /// Save a rendered preview.
    pub fn save_preview(&self, image: &image::RgbaImage, path: &Path) -> Result<(), CliError> {
        save_image(image, path)?;
        info!(path = %path.display(), "Saved preview");
        println!("Preview saved: {}", path.display());
        Ok(())
    }
}
