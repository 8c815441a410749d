//! Loading shapefiles into feature collections.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::LoadError;
use crate::crs::CrsSpec;
use crate::feature::{Feature, FeatureCollection, FieldDef, Schema};
use crate::shapefile::{self, DbfTable, Encoding, ShapefileError};

/// Load a vector layer from disk.
///
/// Only ESRI shapefiles are supported. The `.prj` sidecar, when present, is
/// kept verbatim as the collection CRS; without one the CRS is `None` and is
/// never guessed.
///
/// # Errors
///
/// - [`LoadError::NotFound`] if `path` does not exist
/// - [`LoadError::UnsupportedFormat`] for other extensions or a bad file code
/// - [`LoadError::Empty`] if the layer has no records
/// - [`LoadError::Malformed`] / [`LoadError::RecordCountMismatch`] for
///   damaged files
pub fn load(path: &Path) -> Result<FeatureCollection, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("shp"));
    if !is_shp {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: "expected a .shp file".to_string(),
        });
    }

    let shp_bytes = read(path)?;
    let contents = shapefile::read_shp(&shp_bytes).map_err(|e| match e {
        ShapefileError::InvalidFileCode(_) => LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
        other => LoadError::Malformed {
            path: path.to_path_buf(),
            source: other,
        },
    })?;

    if contents.shapes.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let encoding = match sidecar(path, "cpg") {
        Some(cpg) => Encoding::from_cpg(&String::from_utf8_lossy(&read(&cpg)?)),
        None => Encoding::default(),
    };

    let table = match sidecar(path, "dbf") {
        Some(dbf) => {
            let table = shapefile::read_dbf(&read(&dbf)?, encoding).map_err(|source| {
                LoadError::Malformed {
                    path: dbf.clone(),
                    source,
                }
            })?;
            if table.records.len() != contents.shapes.len() {
                return Err(LoadError::RecordCountMismatch {
                    path: path.to_path_buf(),
                    shapes: contents.shapes.len(),
                    records: table.records.len(),
                });
            }
            if table.deleted > 0 {
                debug!(path = %dbf.display(), deleted = table.deleted, "Keeping deleted dBase records");
            }
            table
        }
        None => {
            warn!(path = %path.display(), "No .dbf sidecar, features will have no attributes");
            DbfTable::default()
        }
    };

    let crs = match sidecar(path, "prj") {
        Some(prj) => {
            let text = String::from_utf8_lossy(&read(&prj)?).trim().to_string();
            (!text.is_empty()).then(|| CrsSpec::new(text))
        }
        None => None,
    };

    let collection = build_collection(contents.shapes, table, crs);
    info!(
        path = %path.display(),
        features = collection.len(),
        shape_type = %contents.shape_type,
        crs = collection.crs().map(|c| c.summary()).unwrap_or_else(|| "none".to_string()),
        "Loaded layer"
    );
    Ok(collection)
}

fn build_collection(
    shapes: Vec<Option<geo::Geometry<f64>>>,
    table: DbfTable,
    crs: Option<CrsSpec>,
) -> FeatureCollection {
    let schema = Schema::from_fields(
        table
            .fields
            .iter()
            .map(|field| FieldDef::new(field.name.clone(), field.kind())),
    );

    let mut records = table.records.into_iter();
    let mut collection = FeatureCollection::new(schema, crs);
    for geometry in shapes {
        let mut feature = Feature {
            geometry,
            ..Feature::default()
        };
        if let Some(values) = records.next() {
            for (field, value) in table.fields.iter().zip(values) {
                feature.attributes.insert(field.name.clone(), value);
            }
        }
        collection.push(feature);
    }
    collection
}

fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Find a sibling file with the given extension, in lower or upper case.
fn sidecar(path: &Path, extension: &str) -> Option<PathBuf> {
    [extension.to_ascii_lowercase(), extension.to_ascii_uppercase()]
        .into_iter()
        .map(|ext| path.with_extension(ext))
        .find(|candidate| candidate.is_file())
}
