//! Error types for CRS parsing and resolution.

use thiserror::Error;

/// Errors raised while interpreting or applying a CRS.
#[derive(Debug, Error)]
pub enum CrsError {
    /// No target CRS was given.
    #[error("No target CRS specified")]
    MissingTargetCrs,

    /// The CRS text does not name a known coordinate system.
    #[error("Unrecognized CRS '{spec}': {reason}")]
    InvalidCrs { spec: String, reason: String },

    /// A coordinate could not be projected.
    #[error("Failed to transform coordinate ({x}, {y}): {reason}")]
    Transform { x: f64, y: f64, reason: String },
}

impl CrsError {
    pub(crate) fn invalid(spec: &str, reason: impl Into<String>) -> Self {
        let spec = super::CrsSpec::new(spec).summary();
        CrsError::InvalidCrs {
            spec,
            reason: reason.into(),
        }
    }
}
