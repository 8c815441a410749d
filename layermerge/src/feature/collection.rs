//! Features, schemas and feature collections.

use std::collections::{BTreeSet, HashMap};

use geo::{BoundingRect, Rect};

use super::value::{FieldKind, FieldValue};
use super::{geometry_type_name, Geometry};
use crate::crs::CrsSpec;

/// A named, typed attribute column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared kind
    pub kind: FieldKind,
}

impl FieldDef {
    /// Create a field definition.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered set of field definitions, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from field definitions. Later duplicates are widened into
    /// the first occurrence.
    pub fn from_fields(fields: impl IntoIterator<Item = FieldDef>) -> Self {
        let mut schema = Self::new();
        for field in fields {
            schema.add(field);
        }
        schema
    }

    /// Add a field. If a field with the same name exists, its kind is widened
    /// to hold both. Returns true when the field was new.
    pub fn add(&mut self, field: FieldDef) -> bool {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => {
                existing.kind = existing.kind.widen(field.kind);
                false
            }
            None => {
                self.fields.push(field);
                true
            }
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if the schema has a field with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field definitions in order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A geometry plus its attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    /// Geometry, or `None` for a null shape.
    pub geometry: Option<Geometry<f64>>,
    /// Attribute values keyed by field name.
    pub attributes: HashMap<String, FieldValue>,
}

impl Feature {
    /// Create a feature with a geometry and no attributes.
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            attributes: HashMap::new(),
        }
    }

    /// Create a feature without geometry.
    pub fn null() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Value of a field; absent fields read as null.
    pub fn attribute(&self, name: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.attributes.get(name).unwrap_or(&NULL)
    }
}

/// An ordered collection of features sharing a schema and a CRS.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    features: Vec<Feature>,
    schema: Schema,
    crs: Option<CrsSpec>,
}

impl FeatureCollection {
    /// Create an empty collection.
    pub fn new(schema: Schema, crs: Option<CrsSpec>) -> Self {
        Self {
            features: Vec::new(),
            schema,
            crs,
        }
    }

    /// Create a collection from existing features.
    pub fn with_features(features: Vec<Feature>, schema: Schema, crs: Option<CrsSpec>) -> Self {
        Self {
            features,
            schema,
            crs,
        }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declared CRS, `None` when the source carried no CRS metadata.
    pub fn crs(&self) -> Option<&CrsSpec> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<CrsSpec>) {
        self.crs = crs;
    }

    /// Split into parts, for stages that rebuild the collection.
    pub fn into_parts(self) -> (Vec<Feature>, Schema, Option<CrsSpec>) {
        (self.features, self.schema, self.crs)
    }

    /// Iterator over the non-null geometries.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry<f64>> {
        self.features.iter().filter_map(|f| f.geometry.as_ref())
    }

    /// Distinct geometry type names present in the collection.
    pub fn geometry_types(&self) -> BTreeSet<&'static str> {
        self.geometries().map(geometry_type_name).collect()
    }

    /// Combined bounding box of all geometries, `None` if there are none.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometries()
            .filter_map(|g| g.bounding_rect())
            .reduce(|acc, r| {
                Rect::new(
                    (acc.min().x.min(r.min().x), acc.min().y.min(r.min().y)),
                    (acc.max().x.max(r.max().x), acc.max().y.max(r.max().y)),
                )
            })
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
