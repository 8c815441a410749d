//! Shapefile codec errors.

use thiserror::Error;

/// Errors raised while decoding or encoding shapefile components.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapefileError {
    /// The data ended before a structure was complete.
    #[error("Unexpected end of data reading {context} at byte {offset}")]
    Truncated { context: &'static str, offset: usize },

    /// The `.shp`/`.shx` file code is not 9994.
    #[error("Invalid file code {0}, not a shapefile")]
    InvalidFileCode(i32),

    /// The shape type is unknown or not supported (MultiPatch).
    #[error("Unsupported shape type {0}")]
    UnsupportedShapeType(i32),

    /// A record is internally inconsistent.
    #[error("Invalid record {record}: {reason}")]
    InvalidRecord { record: usize, reason: String },

    /// The `.dbf` table is malformed.
    #[error("Invalid dBase table: {0}")]
    InvalidDbf(String),

    /// Output exceeds a format limit.
    #[error("Shapefile limit exceeded: {0}")]
    TooLarge(String),
}

impl ShapefileError {
    pub(crate) fn record(record: usize, reason: impl Into<String>) -> Self {
        ShapefileError::InvalidRecord {
            record,
            reason: reason.into(),
        }
    }
}
