//! Exporting feature collections as shapefiles.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::WriteError;
use crate::crs::CrsDefinition;
use crate::feature::{geometry_type_name, FeatureCollection, FieldKind, FieldValue};
use crate::shapefile::{self, DbfField, Encoding, ShapeFamily};

/// Column written when the collection has no attributes; dBase tables need
/// at least one field.
const FALLBACK_FIELD: &str = "FID";

/// Write a collection as a shapefile into `destination`.
///
/// `filename` names the `.shp` file (its extension is ignored). The
/// destination directory tree is created, and existing files of the same
/// name are overwritten. A `.prj` is written when the collection CRS has a
/// WKT form; otherwise any stale `.prj` is removed.
///
/// Returns the path of the written `.shp`.
pub fn write(
    collection: &FeatureCollection,
    destination: &Path,
    filename: &str,
) -> Result<PathBuf, WriteError> {
    if collection.is_empty() {
        return Err(WriteError::EmptyInput);
    }

    let family = shape_family(collection)?;
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("output");

    let shapes: Vec<_> = collection.iter().map(|f| f.geometry.as_ref()).collect();
    let encoded = shapefile::encode_shp(family.shape_type(), &shapes)?;
    let dbf = encode_attributes(collection)?;

    fs::create_dir_all(destination).map_err(|source| WriteError::Io {
        path: destination.to_path_buf(),
        source,
    })?;

    let shp_path = destination.join(format!("{}.shp", stem));
    write_file(&shp_path, &encoded.shp)?;
    write_file(&shp_path.with_extension("shx"), &encoded.shx)?;
    write_file(&shp_path.with_extension("dbf"), &dbf)?;
    write_file(
        &shp_path.with_extension("cpg"),
        Encoding::Utf8.cpg_name().as_bytes(),
    )?;

    let prj_path = shp_path.with_extension("prj");
    match prj_text(collection) {
        Some(wkt) => write_file(&prj_path, wkt.as_bytes())?,
        None if prj_path.exists() => {
            fs::remove_file(&prj_path).map_err(|source| WriteError::Io {
                path: prj_path.clone(),
                source,
            })?;
        }
        None => {}
    }

    info!(
        path = %shp_path.display(),
        features = collection.len(),
        shape_type = family.name(),
        "Exported shapefile"
    );
    Ok(shp_path)
}

/// The single shape family the collection fits in.
fn shape_family(collection: &FeatureCollection) -> Result<ShapeFamily, WriteError> {
    let mut families = BTreeSet::new();
    for geometry in collection.geometries() {
        let family = ShapeFamily::of(geometry)
            .ok_or_else(|| WriteError::UnsupportedGeometry(geometry_type_name(geometry)))?;
        families.insert(family);
    }

    match families.len() {
        // Only null shapes; any type will do
        0 => Ok(ShapeFamily::Point),
        1 => Ok(families.into_iter().next().unwrap_or(ShapeFamily::Point)),
        _ => Err(WriteError::MixedGeometry {
            families: families.iter().map(|f| f.name().to_string()).collect(),
        }),
    }
}

fn encode_attributes(collection: &FeatureCollection) -> Result<Vec<u8>, WriteError> {
    let encoding = Encoding::Utf8;
    let schema = collection.schema();

    if schema.is_empty() {
        let ids: Vec<FieldValue> = (0..collection.len() as i64).map(FieldValue::Integer).collect();
        let field = DbfField::for_values(FALLBACK_FIELD, FieldKind::Integer, ids.iter(), encoding);
        let records: Vec<Vec<FieldValue>> = ids.into_iter().map(|id| vec![id]).collect();
        return Ok(shapefile::encode_dbf(&[field], &records, encoding)?);
    }

    let names = shapefile::field_names(schema.names(), encoding);
    for (original, written) in schema.names().zip(&names) {
        if original != written {
            debug!(field = original, column = %written, "Renamed field for dBase");
        }
    }

    let fields: Vec<DbfField> = schema
        .fields()
        .iter()
        .zip(names)
        .map(|(def, name)| {
            let values = collection.iter().map(|f| f.attribute(&def.name));
            // Values may be wider than the declared kind
            let kind = values
                .clone()
                .filter_map(FieldValue::kind)
                .fold(def.kind, FieldKind::widen);
            DbfField::for_values(name, kind, values, encoding)
        })
        .collect();

    let records: Vec<Vec<FieldValue>> = collection
        .iter()
        .map(|feature| {
            schema
                .fields()
                .iter()
                .map(|def| feature.attribute(&def.name).clone())
                .collect()
        })
        .collect();

    Ok(shapefile::encode_dbf(&fields, &records, encoding)?)
}

fn prj_text(collection: &FeatureCollection) -> Option<String> {
    let spec = collection.crs()?;
    match CrsDefinition::parse(spec) {
        Ok(definition) => definition.wkt().map(str::to_string),
        Err(e) => {
            warn!(crs = %spec.summary(), error = %e, "CRS has no WKT form, skipping .prj");
            None
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    fs::write(path, bytes).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}
