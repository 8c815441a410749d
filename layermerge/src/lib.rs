//! layermerge - reproject and merge vector layers
//!
//! Loads several shapefiles, brings each onto one target CRS, merges their
//! features into a single layer and either previews or exports the result.
//!
//! # High-Level API
//!
//! The [`pipeline`] module runs the whole sequence for one request:
//!
//! ```ignore
//! use layermerge::pipeline::{PipelineOrchestrator, PipelineRequest, Silent};
//!
//! let orchestrator = PipelineOrchestrator::new();
//! let request = PipelineRequest::export(paths, "EPSG:3857", destination);
//! let outcome = orchestrator.run(&request, &Silent, &Silent)?;
//! ```
//!
//! The stages are usable on their own: [`layer::load`], [`crs::resolve`],
//! [`merge::merge`], [`preview::PreviewRenderer`] and [`layer::write`].

pub mod config;
pub mod crs;
pub mod feature;
pub mod layer;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod preview;
pub mod shapefile;

/// Version of the layermerge library and CLI.
///
/// Synchronized across the workspace from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
