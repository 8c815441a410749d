//! Merging resolved collections into one.
//!
//! Merging is plain concatenation: features keep their source order, the
//! schema is the union of the source schemas in first-seen order, and rows
//! get an explicit [`FieldValue::Null`] for fields their source lacked. No
//! deduplication or geometry processing takes place.

use thiserror::Error;
use tracing::debug;

use crate::crs::{CrsDefinition, CrsSpec};
use crate::feature::{FeatureCollection, FieldValue, Schema};

/// Errors raised by [`merge`].
#[derive(Debug, Error)]
pub enum MergeError {
    /// No collections were given.
    #[error("Nothing to merge: no collections given")]
    EmptyInput,

    /// The collections are not in the same CRS.
    #[error("Cannot merge collections in different CRSs: '{expected}' and '{found}'")]
    CrsMismatch { expected: String, found: String },
}

/// Merge collections that share a CRS.
///
/// # Errors
///
/// - [`MergeError::EmptyInput`] for an empty sequence
/// - [`MergeError::CrsMismatch`] when any collection's CRS differs from the first
pub fn merge(
    collections: impl IntoIterator<Item = FeatureCollection>,
) -> Result<FeatureCollection, MergeError> {
    let collections: Vec<FeatureCollection> = collections.into_iter().collect();
    let Some(first) = collections.first() else {
        return Err(MergeError::EmptyInput);
    };

    let crs = first.crs().cloned();
    for other in &collections[1..] {
        if !same_crs(crs.as_ref(), other.crs()) {
            return Err(MergeError::CrsMismatch {
                expected: describe(crs.as_ref()),
                found: describe(other.crs()),
            });
        }
    }

    let mut schema = Schema::new();
    for collection in &collections {
        for field in collection.schema().fields() {
            schema.add(field.clone());
        }
    }

    let total: usize = collections.iter().map(FeatureCollection::len).sum();
    let mut merged = FeatureCollection::new(schema.clone(), crs);
    let sources = collections.len();

    for collection in collections {
        let (features, _, _) = collection.into_parts();
        for mut feature in features {
            for name in schema.names() {
                if !feature.attributes.contains_key(name) {
                    feature.attributes.insert(name.to_string(), FieldValue::Null);
                }
            }
            merged.push(feature);
        }
    }

    debug!(
        sources,
        features = total,
        fields = merged.schema().len(),
        "Merged collections"
    );
    Ok(merged)
}

fn same_crs(a: Option<&CrsSpec>, b: Option<&CrsSpec>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) if a.as_str().trim() == b.as_str().trim() => true,
        (Some(a), Some(b)) => match (CrsDefinition::parse(a), CrsDefinition::parse(b)) {
            (Ok(a), Ok(b)) => a.same_as(&b),
            _ => false,
        },
        _ => false,
    }
}

fn describe(crs: Option<&CrsSpec>) -> String {
    crs.map(CrsSpec::summary).unwrap_or_else(|| "none".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, FieldDef, FieldKind, Geometry};
    use geo::point;

    fn layer(crs: &str, fields: &[(&str, FieldKind)], rows: usize, tag: &str) -> FeatureCollection {
        let schema = Schema::from_fields(fields.iter().map(|(n, k)| FieldDef::new(*n, *k)));
        let mut collection = FeatureCollection::new(schema, Some(CrsSpec::new(crs)));
        for i in 0..rows {
            let mut feature = Feature::new(Geometry::Point(point!(x: i as f64, y: 0.0)));
            for (name, _) in fields {
                feature = feature.with_attribute(*name, format!("{}-{}", tag, i));
            }
            collection.push(feature);
        }
        collection
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            merge(Vec::<FeatureCollection>::new()),
            Err(MergeError::EmptyInput)
        ));
    }

    #[test]
    fn test_counts_add_up_in_order() {
        let a = layer("EPSG:3857", &[("name", FieldKind::Text)], 10, "a");
        let b = layer("EPSG:3857", &[("name", FieldKind::Text)], 5, "b");
        let merged = merge([a, b]).unwrap();

        assert_eq!(merged.len(), 15);
        assert_eq!(merged.features()[9].attribute("name"), &FieldValue::from("a-9"));
        assert_eq!(merged.features()[10].attribute("name"), &FieldValue::from("b-0"));
        assert_eq!(merged.crs().unwrap().as_str(), "EPSG:3857");
    }

    #[test]
    fn test_schema_union_fills_nulls() {
        let a = layer("EPSG:4326", &[("id", FieldKind::Text), ("road", FieldKind::Text)], 2, "a");
        let b = layer("EPSG:4326", &[("id", FieldKind::Text), ("river", FieldKind::Text)], 1, "b");
        let merged = merge([a, b]).unwrap();

        let names: Vec<_> = merged.schema().names().collect();
        assert_eq!(names, vec!["id", "road", "river"]);

        let from_a = &merged.features()[0];
        assert_eq!(from_a.attributes.get("river"), Some(&FieldValue::Null));
        let from_b = &merged.features()[2];
        assert_eq!(from_b.attributes.get("road"), Some(&FieldValue::Null));
        assert_eq!(from_b.attribute("river"), &FieldValue::from("b-0"));
    }

    #[test]
    fn test_conflicting_kinds_widen() {
        let a = layer("EPSG:4326", &[("v", FieldKind::Integer)], 1, "a");
        let b = layer("EPSG:4326", &[("v", FieldKind::Float)], 1, "b");
        let c = layer("EPSG:4326", &[("w", FieldKind::Date)], 1, "c");
        let d = layer("EPSG:4326", &[("w", FieldKind::Boolean)], 1, "d");
        let merged = merge([a, b, c, d]).unwrap();
        assert_eq!(merged.schema().field("v").unwrap().kind, FieldKind::Float);
        assert_eq!(merged.schema().field("w").unwrap().kind, FieldKind::Text);
    }

    #[test]
    fn test_crs_mismatch() {
        let a = layer("EPSG:4326", &[], 1, "a");
        let b = layer("EPSG:3857", &[], 1, "b");
        assert!(matches!(merge([a, b]), Err(MergeError::CrsMismatch { .. })));
    }

    #[test]
    fn test_equivalent_crs_spellings_merge() {
        let a = layer("EPSG:4326", &[], 1, "a");
        let b = layer("urn:ogc:def:crs:EPSG::4326", &[], 1, "b");
        assert_eq!(merge([a, b]).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let a = layer("EPSG:4326", &[("n", FieldKind::Text)], 1, "x");
        let merged = merge([a.clone(), a]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.features()[0], merged.features()[1]);
    }
}
