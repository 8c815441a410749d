//! Coordinate transformation between two CRS definitions.

use geo::{Coord, Geometry, MapCoordsInPlace};
use proj4rs::adaptors::transform_xy;

use super::definition::CrsDefinition;
use super::error::CrsError;

/// Reprojects coordinates from a source CRS to a target CRS.
///
/// Geographic coordinates are handled in degrees on both sides; the
/// conversion to the radians proj4rs works in happens internally.
#[derive(Debug, Clone)]
pub struct CoordinateTransform {
    source: CrsDefinition,
    target: CrsDefinition,
}

impl CoordinateTransform {
    pub fn new(source: CrsDefinition, target: CrsDefinition) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &CrsDefinition {
        &self.source
    }

    pub fn target(&self) -> &CrsDefinition {
        &self.target
    }

    /// Returns true when source and target are the same system.
    pub fn is_identity(&self) -> bool {
        self.source.same_as(&self.target)
    }

    /// Transform a single coordinate.
    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, CrsError> {
        if self.is_identity() {
            return Ok(coord);
        }
        self.project(coord)
    }

    /// Transform every coordinate of a geometry in place.
    ///
    /// On error the geometry may be partially transformed; callers discard it.
    pub fn transform_geometry(&self, geometry: &mut Geometry<f64>) -> Result<(), CrsError> {
        if self.is_identity() {
            return Ok(());
        }
        self.project_geometry(geometry)
    }

    // Dispatch per variant: `Geometry::try_map_coords_in_place` nests the
    // closure type once per collection level and never finishes monomorphizing.
    fn project_geometry(&self, geometry: &mut Geometry<f64>) -> Result<(), CrsError> {
        let project = |coord: Coord<f64>| self.project(coord);
        match geometry {
            Geometry::Point(g) => g.try_map_coords_in_place(project),
            Geometry::Line(g) => g.try_map_coords_in_place(project),
            Geometry::LineString(g) => g.try_map_coords_in_place(project),
            Geometry::Polygon(g) => g.try_map_coords_in_place(project),
            Geometry::MultiPoint(g) => g.try_map_coords_in_place(project),
            Geometry::MultiLineString(g) => g.try_map_coords_in_place(project),
            Geometry::MultiPolygon(g) => g.try_map_coords_in_place(project),
            Geometry::Rect(g) => g.try_map_coords_in_place(project),
            Geometry::Triangle(g) => g.try_map_coords_in_place(project),
            Geometry::GeometryCollection(collection) => collection
                .iter_mut()
                .try_for_each(|member| self.project_geometry(member)),
        }
    }

    fn project(&self, coord: Coord<f64>) -> Result<Coord<f64>, CrsError> {
        let (mut x, mut y) = (coord.x, coord.y);
        if self.source.is_geographic() {
            x = x.to_radians();
            y = y.to_radians();
        }

        let (mut out_x, mut out_y) = transform_xy(self.source.proj(), self.target.proj(), x, y)
            .map_err(|e| CrsError::Transform {
                x: coord.x,
                y: coord.y,
                reason: e.to_string(),
            })?;

        if self.target.is_geographic() {
            out_x = out_x.to_degrees();
            out_y = out_y.to_degrees();
        }

        if !out_x.is_finite() || !out_y.is_finite() {
            return Err(CrsError::Transform {
                x: coord.x,
                y: coord.y,
                reason: "result is not finite".to_string(),
            });
        }

        Ok(Coord { x: out_x, y: out_y })
    }
}
