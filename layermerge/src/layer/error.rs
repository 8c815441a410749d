//! Layer I/O errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shapefile::ShapefileError;

/// Errors raised while loading a vector layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported vector format {}: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("Source contains no features: {}", path.display())]
    Empty { path: PathBuf },

    #[error("Malformed shapefile {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ShapefileError,
    },

    #[error(
        "Record count mismatch in {}: {shapes} shapes but {records} attribute records",
        path.display()
    )]
    RecordCountMismatch {
        path: PathBuf,
        shapes: usize,
        records: usize,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// The file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::UnsupportedFormat { path, .. }
            | LoadError::Empty { path }
            | LoadError::Malformed { path, .. }
            | LoadError::RecordCountMismatch { path, .. }
            | LoadError::Io { path, .. } => path,
        }
    }
}

/// Errors raised while exporting a collection.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Nothing to export: the collection has no features")]
    EmptyInput,

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A shapefile holds one geometry family, found: {}", families.join(", "))]
    MixedGeometry { families: Vec<String> },

    #[error("Geometry type {0} cannot be stored in a shapefile")]
    UnsupportedGeometry(&'static str),

    #[error("Failed to encode shapefile: {0}")]
    Encode(#[from] ShapefileError),
}
