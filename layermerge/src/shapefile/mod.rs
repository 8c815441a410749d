//! ESRI shapefile codec.
//!
//! A shapefile is a set of sibling files sharing a stem:
//!
//! | File | Content |
//! |------|---------|
//! | `.shp` | Geometries |
//! | `.shx` | Record offsets into `.shp` |
//! | `.dbf` | dBase III attribute table, one record per shape |
//! | `.cpg` | Text encoding of the `.dbf` (optional) |
//! | `.prj` | CRS as WKT (optional) |
//!
//! This module only converts bytes; file discovery lives in [`crate::layer`].

mod bytes;
mod dbf;
mod error;
mod shp;
mod types;

pub use dbf::{
    encode_dbf, field_names, read_dbf, DbfField, DbfTable, Encoding, MAX_NAME_LEN, MAX_TEXT_WIDTH,
};
pub use error::ShapefileError;
pub use shp::{encode_shp, read_shp, ShpContents, ShpEncoded};
pub use types::{ShapeFamily, ShapeType};
