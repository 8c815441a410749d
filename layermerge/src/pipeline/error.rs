//! Pipeline errors.

use thiserror::Error;

use crate::crs::CrsError;
use crate::layer::{LoadError, WriteError};
use crate::merge::MergeError;
use crate::preview::PreviewError;

/// Why a run stopped. Every stage fails fast; nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request lists no sources.
    #[error("No source layers selected")]
    NoSources,

    /// Another run holds the orchestrator.
    #[error("A pipeline run is already in progress")]
    AlreadyRunning,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Crs(#[from] CrsError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
