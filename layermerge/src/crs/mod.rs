//! Coordinate reference system handling.
//!
//! This module turns user supplied CRS strings (EPSG codes, PROJ strings,
//! WKT from `.prj` sidecars) into usable definitions and normalizes feature
//! collections onto a single target CRS.
//!
//! # Assign vs transform
//!
//! A layer without CRS metadata is ambiguous: nothing says what its numbers
//! mean. The resolver treats the target CRS as a declaration for such layers
//! ([`CrsAction::Assign`]) and leaves coordinates alone. Layers with a known
//! CRS are reprojected ([`CrsAction::Transform`]).
//!
//! ```
//! use layermerge::crs::{CrsAction, CrsResolver, CrsSpec};
//!
//! let resolver = CrsResolver::new(&CrsSpec::new("EPSG:3857")).unwrap();
//! assert!(matches!(resolver.plan(None).unwrap(), CrsAction::Assign));
//! ```

mod definition;
mod error;
pub mod registry;
mod resolver;
mod spec;
mod transform;
pub mod wkt;

pub use definition::CrsDefinition;
pub use error::CrsError;
pub use resolver::{resolve, CrsAction, CrsResolver};
pub use spec::CrsSpec;
pub use transform::CoordinateTransform;
