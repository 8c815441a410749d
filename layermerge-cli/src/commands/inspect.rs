//! `layermerge inspect`: describe a shapefile.

use std::path::Path;

use layermerge::crs::CrsDefinition;
use layermerge::feature::FeatureCollection;
use layermerge::layer;

use crate::error::CliError;

pub fn run(path: &Path) -> Result<(), CliError> {
    let collection = layer::load(path)?;
    print!("{}", describe(path, &collection));
    Ok(())
}

/// Human readable summary of a loaded layer.
fn describe(path: &Path, collection: &FeatureCollection) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", path.display()));
    out.push_str(&format!("  Features: {}\n", collection.len()));

    let types: Vec<_> = collection.geometry_types().into_iter().collect();
    let types = if types.is_empty() {
        "none".to_string()
    } else {
        types.join(", ")
    };
    out.push_str(&format!("  Geometry: {}\n", types));

    let crs = match collection.crs() {
        None => "none (will be assigned the target CRS)".to_string(),
        Some(spec) => match CrsDefinition::parse(spec) {
            Ok(definition) => format!("{} ({})", definition.label(), definition.name()),
            Err(_) => format!("unrecognized: {}", spec.summary()),
        },
    };
    out.push_str(&format!("  CRS: {}\n", crs));

    if let Some(rect) = collection.bounding_rect() {
        out.push_str(&format!(
            "  Extent: ({}, {}) - ({}, {})\n",
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y
        ));
    }

    out.push_str(&format!("  Fields: {}\n", collection.schema().len()));
    for field in collection.schema().fields() {
        out.push_str(&format!("    {:<12} {}\n", field.name, field.kind.name()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use layermerge::crs::CrsSpec;
    use layermerge::feature::{Feature, FieldDef, FieldKind, Geometry, Schema};

    #[test]
    fn test_describe() {
        let schema = Schema::from_fields([FieldDef::new("name", FieldKind::Text)]);
        let mut collection = FeatureCollection::new(schema, Some(CrsSpec::new("EPSG:3857")));
        collection.push(Feature::new(Geometry::Point(geo::point!(x: 1.0, y: 2.0))));

        let text = describe(Path::new("roads.shp"), &collection);
        assert!(text.contains("Features: 1"));
        assert!(text.contains("Geometry: Point"));
        assert!(text.contains("CRS: EPSG:3857"));
        assert!(text.contains("name"));
    }

    #[test]
    fn test_describe_without_crs() {
        let text = describe(Path::new("bare.shp"), &FeatureCollection::default());
        assert!(text.contains("CRS: none"));
        assert!(text.contains("Geometry: none"));
    }

    #[test]
    fn test_inspect_written_layer() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut collection = FeatureCollection::default();
        collection.push(Feature::new(Geometry::Point(geo::point!(x: 0.0, y: 0.0))));
        let path = layer::write(&collection, dir.path(), "one.shp").unwrap();
        assert!(run(&path).is_ok());
        assert!(run(&dir.path().join("missing.shp")).is_err());
    }
}
