//! Helpers shared by the pipeline commands.

use std::path::PathBuf;

use clap::Args;
use layermerge::config::ConfigFile;
use layermerge::crs::CrsSpec;
use layermerge::pipeline::{PipelineOutcome, PipelineStatus};
use layermerge::preview::PreviewConfig;

use crate::error::CliError;

/// Canvas overrides accepted by commands that render previews.
#[derive(Debug, Clone, Default, Args)]
pub struct CanvasArgs {
    /// Preview width in pixels (default from config)
    #[arg(long)]
    pub width: Option<u32>,

    /// Preview height in pixels (default from config)
    #[arg(long)]
    pub height: Option<u32>,
}

impl CanvasArgs {
    /// Config preview settings with the command line overrides applied.
    pub fn preview_config(&self, config: &ConfigFile) -> PreviewConfig {
        let mut preview = config.preview_config();
        if let Some(width) = self.width {
            preview.width = width;
        }
        if let Some(height) = self.height {
            preview.height = height;
        }
        preview
    }
}

/// Target CRS: the command line wins over config.
///
/// With neither, the CRS is left blank and the pipeline reports the
/// missing CRS itself.
pub fn resolve_target_crs(cli: Option<String>, config: &ConfigFile) -> CrsSpec {
    cli.or_else(|| config.pipeline.target_crs.clone())
        .map(CrsSpec::new)
        .unwrap_or_default()
}

/// Destination directory: the command line wins over config.
pub fn resolve_destination(cli: Option<PathBuf>, config: &ConfigFile) -> Result<PathBuf, CliError> {
    cli.or_else(|| config.pipeline.destination.clone())
        .ok_or_else(|| {
            CliError::Usage(
                "No destination: pass --dest or set destination in the [pipeline] section \
                 of config.ini"
                    .to_string(),
            )
        })
}

/// Progress line printed at each milestone.
pub fn progress_line(percent: u8) -> String {
    format!("Progress: {:>3}%", percent)
}

/// Print the terminal status of a run.
pub fn print_status(status: &PipelineStatus) {
    match status {
        PipelineStatus::Success { message, .. } => println!("✓ {}", message),
        PipelineStatus::Failure { reason } => eprintln!("✗ {}", reason),
    }
}

/// Print what the resolver did to each source.
pub fn print_actions(sources: &[PathBuf], outcome: &PipelineOutcome) {
    for (path, action) in sources.iter().zip(&outcome.actions) {
        println!("  {}: {}", path.display(), action);
    }
}
