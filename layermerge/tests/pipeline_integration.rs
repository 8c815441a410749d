//! Integration tests for the reproject-and-merge pipeline.
//!
//! These write real shapefiles into temporary directories and verify:
//! - Feature counts and schema unions across load, resolve and merge
//! - Assign vs transform, and idempotent resolution
//! - Export and reload round trips
//! - Orchestrator scenarios: mixed CRS sources, single source, no sources,
//!   no target CRS, sources outside the common EPSG systems

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use geo::{point, polygon, Coord, CoordsIter};
use layermerge::config::ConfigFile;
use layermerge::crs::{resolve, CrsError, CrsSpec};
use layermerge::feature::{Feature, FeatureCollection, FieldDef, FieldKind, FieldValue, Geometry, Schema};
use layermerge::layer;
use layermerge::merge::{merge, MergeError};
use layermerge::pipeline::{
    PipelineError, PipelineOrchestrator, PipelineRequest, PipelineState, PipelineStatus, Silent,
};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Points around Paris, with an id and a per-layer attribute.
fn point_layer(crs: Option<&str>, count: usize, extra_field: &str) -> FeatureCollection {
    let schema = Schema::from_fields([
        FieldDef::new("id", FieldKind::Integer),
        FieldDef::new(extra_field, FieldKind::Text),
    ]);
    let mut collection = FeatureCollection::new(schema, crs.map(CrsSpec::new));
    for i in 0..count {
        let feature = Feature::new(Geometry::Point(point!(
            x: 2.35 + i as f64 * 0.01,
            y: 48.85 + i as f64 * 0.005
        )))
        .with_attribute("id", i as i64)
        .with_attribute(extra_field, format!("{}#{}", extra_field, i));
        collection.push(feature);
    }
    collection
}

fn write_source(dir: &Path, name: &str, collection: &FeatureCollection) -> PathBuf {
    layer::write(collection, dir, name).expect("fixture should be written")
}

fn coords(collection: &FeatureCollection) -> Vec<Coord<f64>> {
    collection
        .geometries()
        .flat_map(|g| g.coords_iter().collect::<Vec<_>>())
        .collect()
}

fn assert_coords_close(a: &[Coord<f64>], b: &[Coord<f64>], tolerance: f64) {
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(b) {
        assert!(
            (p.x - q.x).abs() <= tolerance && (p.y - q.y).abs() <= tolerance,
            "{:?} vs {:?}",
            p,
            q
        );
    }
}

// =============================================================================
// Stage Properties
// =============================================================================

#[test]
fn test_counts_and_schema_union_through_stages() {
    let dir = TempDir::new().unwrap();
    let roads = write_source(dir.path(), "roads", &point_layer(Some("EPSG:4326"), 4, "road"));
    let rivers = write_source(dir.path(), "rivers", &point_layer(None, 3, "river"));

    let target = CrsSpec::new("EPSG:3857");
    let resolved: Vec<_> = [&roads, &rivers]
        .into_iter()
        .map(|p| resolve(layer::load(p).unwrap(), &target).unwrap())
        .collect();
    let merged = merge(resolved).unwrap();

    assert_eq!(merged.len(), 7);
    let names: Vec<_> = merged.schema().names().collect();
    assert_eq!(names, vec!["id", "road", "river"]);
    assert_eq!(merged.features()[0].attribute("river"), &FieldValue::Null);
    assert_eq!(merged.features()[4].attribute("road"), &FieldValue::Null);
    assert_eq!(
        merged.features()[4].attribute("river"),
        &FieldValue::from("river#0")
    );
}

#[test]
fn test_assign_keeps_coordinates_transform_changes_them() {
    let dir = TempDir::new().unwrap();
    let tagged = layer::load(&write_source(
        dir.path(),
        "tagged",
        &point_layer(Some("EPSG:4326"), 5, "a"),
    ))
    .unwrap();
    let untagged = layer::load(&write_source(dir.path(), "untagged", &point_layer(None, 5, "b")))
        .unwrap();
    assert!(untagged.crs().is_none());

    let target = CrsSpec::new("EPSG:3857");
    let transformed = resolve(tagged.clone(), &target).unwrap();
    let assigned = resolve(untagged.clone(), &target).unwrap();

    assert_eq!(transformed.len(), tagged.len());
    for (before, after) in coords(&tagged).iter().zip(coords(&transformed)) {
        assert!((before.x - after.x).abs() > 1.0);
    }
    assert_eq!(coords(&assigned), coords(&untagged));
    assert_eq!(assigned.crs(), Some(&target));
}

#[test]
fn test_resolve_is_idempotent() {
    let target = CrsSpec::new("EPSG:3857");
    let once = resolve(point_layer(Some("EPSG:4326"), 6, "a"), &target).unwrap();
    let twice = resolve(once.clone(), &target).unwrap();
    assert_coords_close(&coords(&once), &coords(&twice), 1e-9);
}

#[test]
fn test_empty_target_crs_always_fails() {
    for crs in [Some("EPSG:4326"), None] {
        for target in ["", "   "] {
            let err = resolve(point_layer(crs, 1, "a"), &CrsSpec::new(target)).unwrap_err();
            assert!(matches!(err, CrsError::MissingTargetCrs));
        }
    }
}

#[test]
fn test_merging_nothing_fails() {
    assert!(matches!(
        merge(Vec::<FeatureCollection>::new()),
        Err(MergeError::EmptyInput)
    ));
}

#[test]
fn test_export_reload_round_trip() {
    let dir = TempDir::new().unwrap();
    let target = CrsSpec::new("EPSG:3857");

    let mut parcels = FeatureCollection::new(
        Schema::from_fields([FieldDef::new("area", FieldKind::Float)]),
        Some(CrsSpec::new("EPSG:4326")),
    );
    parcels.push(
        Feature::new(Geometry::Polygon(polygon![
            (x: 2.0, y: 48.0),
            (x: 2.1, y: 48.0),
            (x: 2.1, y: 48.1),
            (x: 2.0, y: 48.1),
        ]))
        .with_attribute("area", 0.01),
    );
    let mut more = FeatureCollection::new(
        Schema::from_fields([FieldDef::new("owner", FieldKind::Text)]),
        None,
    );
    more.push(
        Feature::new(Geometry::Polygon(polygon![
            (x: 250000.0, y: 6200000.0),
            (x: 260000.0, y: 6200000.0),
            (x: 260000.0, y: 6210000.0),
        ]))
        .with_attribute("owner", "city"),
    );

    let merged = merge([
        resolve(parcels, &target).unwrap(),
        resolve(more, &target).unwrap(),
    ])
    .unwrap();
    let path = layer::write(&merged, &dir.path().join("Result"), "output.shp").unwrap();
    let reloaded = layer::load(&path).unwrap();

    assert_eq!(reloaded.len(), merged.len());
    assert_eq!(reloaded.geometry_types(), merged.geometry_types());
    assert_eq!(
        reloaded.features()[1].attribute("owner"),
        &FieldValue::from("city")
    );
    assert!(reloaded.features()[1].attribute("area").is_null());
    // Rings may come back re-oriented; the extent must not move
    let (a, b) = (reloaded.bounding_rect().unwrap(), merged.bounding_rect().unwrap());
    assert_coords_close(&[a.min(), a.max()], &[b.min(), b.max()], 1e-6);
    assert!(reloaded.crs().unwrap().as_str().contains("Pseudo-Mercator"));
}

// =============================================================================
// Orchestrator Scenarios
// =============================================================================

#[test]
fn test_scenario_mixed_sources_to_web_mercator() {
    let dir = TempDir::new().unwrap();
    let wgs84 = write_source(dir.path(), "wgs84", &point_layer(Some("EPSG:4326"), 10, "a"));
    let bare = write_source(dir.path(), "bare", &point_layer(None, 5, "b"));
    let destination = dir.path().join("exports");
    let request = PipelineRequest::export(vec![wgs84, bare], "EPSG:3857", &destination);

    let seen = RefCell::new(Vec::new());
    let progress = |p: u8| seen.borrow_mut().push(p);
    let statuses = RefCell::new(Vec::new());
    let status = |s: &PipelineStatus| statuses.borrow_mut().push(s.clone());

    let orchestrator = PipelineOrchestrator::new();
    let outcome = orchestrator.run(&request, &progress, &status).unwrap();

    assert_eq!(outcome.feature_count, 15);
    assert!(!outcome.actions[0].keeps_coordinates());
    assert!(outcome.actions[1].keeps_coordinates());

    let output = destination.join("Result").join("output.shp");
    assert_eq!(outcome.output.as_deref(), Some(output.as_path()));
    assert_eq!(layer::load(&output).unwrap().len(), 15);
    let written: Vec<_> = fs::read_dir(destination.join("Result"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "shp"))
        .collect();
    assert_eq!(written.len(), 1);

    let seen = seen.borrow();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.iter().all(|p| *p <= 100));

    assert_eq!(statuses.borrow().len(), 1);
    assert!(statuses.borrow()[0].is_success());
    assert_eq!(orchestrator.state(), PipelineState::Done);
}

#[test]
fn test_scenario_single_source_already_in_target() {
    let dir = TempDir::new().unwrap();
    let mut mercator = FeatureCollection::new(Schema::new(), Some(CrsSpec::new("EPSG:3857")));
    for i in 0..3 {
        mercator.push(Feature::new(Geometry::Point(point!(
            x: 261600.0 + i as f64 * 100.0,
            y: 6250000.0
        ))));
    }
    let source = write_source(dir.path(), "mercator", &mercator);
    let loaded = layer::load(&source).unwrap();

    let resolved = resolve(loaded.clone(), &CrsSpec::new("EPSG:3857")).unwrap();
    assert_coords_close(&coords(&resolved), &coords(&loaded), 1e-9);

    let request = PipelineRequest::preview(vec![source], "EPSG:3857");
    let orchestrator = PipelineOrchestrator::new();
    let outcome = orchestrator.run(&request, &Silent, &Silent).unwrap();
    assert_eq!(outcome.feature_count, 3);
    assert!(outcome.actions[0].keeps_coordinates());
    assert!(outcome.preview.is_some());
}

#[test]
fn test_scenario_no_sources() {
    let dir = TempDir::new().unwrap();
    let request = PipelineRequest::export(Vec::new(), "EPSG:3857", dir.path());
    let seen = RefCell::new(Vec::new());
    let progress = |p: u8| seen.borrow_mut().push(p);

    let orchestrator = PipelineOrchestrator::new();
    let result = orchestrator.run(&request, &progress, &Silent);

    assert!(matches!(result, Err(PipelineError::NoSources)));
    assert_eq!(orchestrator.state(), PipelineState::Idle);
    assert!(seen.borrow().is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_scenario_default_config_requires_a_crs() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), "unknown", &point_layer(None, 4, "a"));
    let destination = dir.path().join("out");

    let config = ConfigFile::default();
    let target = config
        .pipeline
        .target_crs
        .clone()
        .map(CrsSpec::new)
        .unwrap_or_default();
    let request = PipelineRequest::export(vec![source], target, destination.clone());

    let orchestrator = PipelineOrchestrator::new();
    let err = orchestrator.run(&request, &Silent, &Silent).unwrap_err();

    assert!(matches!(err, PipelineError::Crs(CrsError::MissingTargetCrs)));
    assert!(!destination.exists());
}

#[test]
fn test_scenario_state_plane_and_laea_sources() {
    let dir = TempDir::new().unwrap();
    let mut laea = FeatureCollection::new(
        Schema::from_fields([FieldDef::new("id", FieldKind::Integer)]),
        Some(CrsSpec::new("EPSG:3035")),
    );
    laea.push(Feature::new(Geometry::Point(point!(x: 4_321_000.0, y: 3_210_000.0))).with_attribute("id", 1i64));
    let mut long_island = FeatureCollection::new(
        Schema::from_fields([FieldDef::new("id", FieldKind::Integer)]),
        Some(CrsSpec::new("EPSG:2263")),
    );
    long_island.push(Feature::new(Geometry::Point(point!(x: 984_250.0, y: 200_000.0))).with_attribute("id", 2i64));

    let sources = vec![
        write_source(dir.path(), "laea", &laea),
        write_source(dir.path(), "long_island", &long_island),
    ];
    let request = PipelineRequest::export(sources, "EPSG:4326", dir.path());
    let orchestrator = PipelineOrchestrator::new();
    let outcome = orchestrator.run(&request, &Silent, &Silent).unwrap();
    assert_eq!(outcome.feature_count, 2);

    let merged = layer::load(&request.output_path().unwrap()).unwrap();
    let points = coords(&merged);
    assert!((points[0].x - 10.0).abs() < 1e-6 && (points[0].y - 52.0).abs() < 1e-6);
    assert!((points[1].x + 74.0).abs() < 1e-6 && (40.70..40.73).contains(&points[1].y));
}

#[test]
fn test_crs_mismatch_cannot_happen_after_resolution() {
    let dir = TempDir::new().unwrap();
    let utm = write_source(
        dir.path(),
        "utm",
        &resolve(point_layer(Some("EPSG:4326"), 2, "a"), &CrsSpec::new("EPSG:32631")).unwrap(),
    );
    let lambert = write_source(
        dir.path(),
        "lambert",
        &resolve(point_layer(Some("EPSG:4326"), 2, "b"), &CrsSpec::new("EPSG:2154")).unwrap(),
    );

    let request = PipelineRequest::preview(vec![utm, lambert], "EPSG:4326");
    let outcome = PipelineOrchestrator::new()
        .run(&request, &Silent, &Silent)
        .unwrap();
    assert_eq!(outcome.feature_count, 4);
}
