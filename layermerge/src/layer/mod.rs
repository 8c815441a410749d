//! Vector layer input and output.
//!
//! [`load`] reads a shapefile (with its `.dbf`, `.cpg` and `.prj` sidecars)
//! into a [`FeatureCollection`](crate::feature::FeatureCollection);
//! [`write`] exports a collection back to disk.

mod error;
mod loader;
mod writer;

pub use error::{LoadError, WriteError};
pub use loader::load;
pub use writer::write;
