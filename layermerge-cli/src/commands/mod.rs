//! CLI command implementations.
//!
//! - [`export`] - Merge sources and write `Result/output.shp`
//! - [`preview`] - Merge sources and save a PNG preview
//! - [`inspect`] - Describe one shapefile
//! - [`crs`] - Known CRS definitions
//! - [`config`] - Configuration file management

pub mod common;
pub mod config;
pub mod crs;
pub mod export;
pub mod inspect;
pub mod preview;
