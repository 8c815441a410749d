//! Normalizes feature collections onto a target CRS.

use std::fmt;

use tracing::{debug, info};

use super::definition::CrsDefinition;
use super::error::CrsError;
use super::spec::CrsSpec;
use super::transform::CoordinateTransform;
use crate::feature::FeatureCollection;

/// What the resolver does with a collection.
#[derive(Debug, Clone)]
pub enum CrsAction {
    /// The collection has no CRS metadata: declare the target, keep coordinates.
    Assign,
    /// The collection has a CRS: reproject every coordinate.
    Transform(CoordinateTransform),
}

impl CrsAction {
    /// Returns true if coordinates will be left untouched.
    pub fn keeps_coordinates(&self) -> bool {
        match self {
            CrsAction::Assign => true,
            CrsAction::Transform(t) => t.is_identity(),
        }
    }
}

impl fmt::Display for CrsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsAction::Assign => write!(f, "assigned"),
            CrsAction::Transform(t) if t.is_identity() => {
                write!(f, "already in {}", t.target().label())
            }
            CrsAction::Transform(t) => write!(
                f,
                "transformed {} -> {}",
                t.source().label(),
                t.target().label()
            ),
        }
    }
}

/// Resolves collections onto one target CRS.
///
/// Construction validates the target, so a resolver that exists always has a
/// usable target definition.
#[derive(Debug, Clone)]
pub struct CrsResolver {
    target_spec: CrsSpec,
    target: CrsDefinition,
}

impl CrsResolver {
    /// Create a resolver for the given target CRS.
    ///
    /// # Errors
    ///
    /// - [`CrsError::MissingTargetCrs`] if the target is blank
    /// - [`CrsError::InvalidCrs`] if it is not a known CRS
    pub fn new(target: &CrsSpec) -> Result<Self, CrsError> {
        if target.is_blank() {
            return Err(CrsError::MissingTargetCrs);
        }
        let definition = CrsDefinition::parse(target)?;
        Ok(Self {
            target_spec: CrsSpec::new(target.as_str().trim()),
            target: definition,
        })
    }

    pub fn target(&self) -> &CrsDefinition {
        &self.target
    }

    pub fn target_spec(&self) -> &CrsSpec {
        &self.target_spec
    }

    /// Decide how a collection with the given source CRS is normalized.
    pub fn plan(&self, source: Option<&CrsSpec>) -> Result<CrsAction, CrsError> {
        match source {
            None => Ok(CrsAction::Assign),
            Some(spec) if spec.is_blank() => Ok(CrsAction::Assign),
            Some(spec) => {
                let source = CrsDefinition::parse(spec)?;
                Ok(CrsAction::Transform(CoordinateTransform::new(
                    source,
                    self.target.clone(),
                )))
            }
        }
    }

    /// Resolve a collection, returning it in the target CRS.
    pub fn resolve(&self, mut collection: FeatureCollection) -> Result<FeatureCollection, CrsError> {
        self.resolve_in_place(&mut collection)?;
        Ok(collection)
    }

    /// Resolve a collection in place and report the action taken.
    ///
    /// On a transform error the collection may be partially transformed and
    /// must be discarded.
    pub fn resolve_in_place(&self, collection: &mut FeatureCollection) -> Result<CrsAction, CrsError> {
        let action = self.plan(collection.crs())?;

        if let CrsAction::Transform(transform) = &action {
            if !transform.is_identity() {
                for feature in collection.features_mut() {
                    if let Some(geometry) = feature.geometry.as_mut() {
                        transform.transform_geometry(geometry)?;
                    }
                }
            }
        }

        match &action {
            CrsAction::Assign => info!(
                target = %self.target.label(),
                features = collection.len(),
                "No CRS metadata, assigning target CRS"
            ),
            other => debug!(features = collection.len(), "CRS {}", other),
        }

        collection.set_crs(Some(self.target_spec.clone()));
        Ok(action)
    }
}

/// Resolve a single collection onto `target`.
pub fn resolve(collection: FeatureCollection, target: &CrsSpec) -> Result<FeatureCollection, CrsError> {
    CrsResolver::new(target)?.resolve(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, Geometry, Schema};
    use geo::{point, polygon};

    fn collection(crs: Option<&str>, geometries: Vec<Geometry<f64>>) -> FeatureCollection {
        FeatureCollection::with_features(
            geometries.into_iter().map(Feature::new).collect(),
            Schema::new(),
            crs.map(CrsSpec::new),
        )
    }

    fn first_point(collection: &FeatureCollection) -> (f64, f64) {
        match collection.features()[0].geometry.as_ref() {
            Some(Geometry::Point(p)) => (p.x(), p.y()),
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_target_is_missing() {
        for target in ["", "   "] {
            assert!(matches!(
                CrsResolver::new(&CrsSpec::new(target)),
                Err(CrsError::MissingTargetCrs)
            ));
        }
    }

    #[test]
    fn test_unknown_target_is_invalid() {
        assert!(matches!(
            CrsResolver::new(&CrsSpec::new("EPSG:0")),
            Err(CrsError::InvalidCrs { .. })
        ));
    }

    #[test]
    fn test_assign_leaves_coordinates() {
        let input = collection(None, vec![Geometry::Point(point!(x: 123.0, y: 456.0))]);
        let output = resolve(input, &CrsSpec::new("EPSG:3857")).unwrap();
        assert_eq!(first_point(&output), (123.0, 456.0));
        assert_eq!(output.crs().unwrap().as_str(), "EPSG:3857");
    }

    #[test]
    fn test_transform_reprojects() {
        let input = collection(
            Some("EPSG:4326"),
            vec![Geometry::Point(point!(x: 10.0, y: 20.0))],
        );
        let output = resolve(input, &CrsSpec::new("EPSG:3857")).unwrap();
        let (x, y) = first_point(&output);
        assert!((x - 1_113_194.907_9).abs() < 0.01);
        assert!((y - 2_273_030.927).abs() < 0.01);
        assert_eq!(output.crs().unwrap().as_str(), "EPSG:3857");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = CrsResolver::new(&CrsSpec::new("EPSG:3857")).unwrap();
        let input = collection(
            Some("EPSG:4326"),
            vec![Geometry::Polygon(polygon![
                (x: 1.0, y: 1.0),
                (x: 5.0, y: 1.0),
                (x: 5.0, y: 4.0),
            ])],
        );
        let once = resolver.resolve(input).unwrap();
        let twice = resolver.resolve(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_plan_choices() {
        let resolver = CrsResolver::new(&CrsSpec::new("EPSG:4326")).unwrap();
        assert!(matches!(resolver.plan(None).unwrap(), CrsAction::Assign));
        assert!(matches!(
            resolver.plan(Some(&CrsSpec::new(""))).unwrap(),
            CrsAction::Assign
        ));

        let same = resolver.plan(Some(&CrsSpec::new("4326"))).unwrap();
        assert!(same.keeps_coordinates());

        let other = resolver.plan(Some(&CrsSpec::new("EPSG:3857"))).unwrap();
        assert!(!other.keeps_coordinates());
        assert_eq!(other.to_string(), "transformed EPSG:3857 -> EPSG:4326");
    }

    #[test]
    fn test_unrecognized_source_is_invalid() {
        let input = collection(
            Some("LOCAL_CS[\"Site grid\"]"),
            vec![Geometry::Point(point!(x: 0.0, y: 0.0))],
        );
        let err = resolve(input, &CrsSpec::new("EPSG:4326")).unwrap_err();
        match err {
            CrsError::InvalidCrs { spec, .. } => assert!(spec.contains("Site grid")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_null_geometries_pass_through() {
        let mut input = collection(Some("EPSG:4326"), vec![]);
        input.push(Feature::null());
        let output = resolve(input, &CrsSpec::new("EPSG:3857")).unwrap();
        assert!(output.features()[0].geometry.is_none());
    }
}
