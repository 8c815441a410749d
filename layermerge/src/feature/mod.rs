//! In-memory vector data model.
//!
//! A [`FeatureCollection`] is what every pipeline stage passes along: an
//! ordered list of [`Feature`]s, the attribute [`Schema`] they share and the
//! coordinate reference system the coordinates are expressed in (if known).
//!
//! Geometries use [`geo::Geometry`] so the rest of the crate can lean on the
//! `geo` algorithms (bounding boxes, winding order, coordinate mapping).

mod collection;
mod value;

pub use collection::{Feature, FeatureCollection, FieldDef, Schema};
pub use geo::Geometry;
pub use value::{FieldKind, FieldValue};

/// Returns the OGC type name of a geometry (`"Point"`, `"Polygon"`, ...).
pub fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};

    #[test]
    fn test_geometry_type_names() {
        assert_eq!(
            geometry_type_name(&Geometry::Point(point!(x: 1.0, y: 2.0))),
            "Point"
        );
        assert_eq!(
            geometry_type_name(&Geometry::LineString(line_string![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 1.0)
            ])),
            "LineString"
        );
        assert_eq!(
            geometry_type_name(&Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0)
            ])),
            "Polygon"
        );
    }
}
