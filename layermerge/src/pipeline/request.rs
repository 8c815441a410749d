//! The unit of work handed to the orchestrator.

use std::path::{Path, PathBuf};

use crate::crs::CrsSpec;

/// Directory created under the destination for exported layers.
pub const RESULT_DIR: &str = "Result";

/// File name of the exported layer.
pub const OUTPUT_FILE: &str = "output.shp";

/// What a run produces after merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineMode {
    /// Render a preview image only.
    Preview,
    /// Write the merged layer to `<destination>/Result/output.shp`.
    Export {
        destination: PathBuf,
        /// Also render a preview; its failure does not fail the export.
        with_preview: bool,
    },
}

/// One pipeline run: which sources, which CRS, what to produce.
///
/// The source list is the only record of what takes part in the run;
/// previews and exports built from the same request see the same layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    /// Source shapefiles, merged in this order
    pub sources: Vec<PathBuf>,
    /// CRS every source is brought into
    pub target_crs: CrsSpec,
    pub mode: PipelineMode,
}

impl PipelineRequest {
    /// A preview-only run.
    pub fn preview(sources: Vec<PathBuf>, target_crs: impl Into<CrsSpec>) -> Self {
        Self {
            sources,
            target_crs: target_crs.into(),
            mode: PipelineMode::Preview,
        }
    }

    /// An export run.
    pub fn export(
        sources: Vec<PathBuf>,
        target_crs: impl Into<CrsSpec>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sources,
            target_crs: target_crs.into(),
            mode: PipelineMode::Export {
                destination: destination.into(),
                with_preview: false,
            },
        }
    }

    /// Ask an export run to render a preview as well.
    pub fn with_preview(mut self) -> Self {
        if let PipelineMode::Export { with_preview, .. } = &mut self.mode {
            *with_preview = true;
        }
        self
    }

    /// Where an export run writes its layer; `None` for previews.
    pub fn output_path(&self) -> Option<PathBuf> {
        match &self.mode {
            PipelineMode::Preview => None,
            PipelineMode::Export { destination, .. } => {
                Some(result_dir(destination).join(OUTPUT_FILE))
            }
        }
    }
}

/// The directory an export into `destination` writes to.
pub fn result_dir(destination: &Path) -> PathBuf {
    destination.join(RESULT_DIR)
}
