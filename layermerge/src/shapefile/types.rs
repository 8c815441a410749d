//! Shape type codes and shape families.

use std::fmt;

use geo::Geometry;

/// Shape type codes from the ESRI shapefile technical description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    /// Map a numeric code to a shape type.
    pub fn from_code(code: i32) -> Option<Self> {
        let shape_type = match code {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            31 => ShapeType::MultiPatch,
            _ => return None,
        };
        Some(shape_type)
    }

    pub fn code(self) -> i32 {
        match self {
            ShapeType::Null => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
            ShapeType::MultiPatch => 31,
        }
    }

    /// The 2D family, or `None` for Null and MultiPatch.
    pub fn family(self) -> Option<ShapeFamily> {
        match self {
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => Some(ShapeFamily::Point),
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                Some(ShapeFamily::PolyLine)
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => {
                Some(ShapeFamily::Polygon)
            }
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                Some(ShapeFamily::MultiPoint)
            }
            ShapeType::Null | ShapeType::MultiPatch => None,
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// What a shapefile can hold, ignoring Z and M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeFamily {
    Point,
    MultiPoint,
    PolyLine,
    Polygon,
}

impl ShapeFamily {
    /// The 2D shape type written for this family.
    pub fn shape_type(self) -> ShapeType {
        match self {
            ShapeFamily::Point => ShapeType::Point,
            ShapeFamily::MultiPoint => ShapeType::MultiPoint,
            ShapeFamily::PolyLine => ShapeType::PolyLine,
            ShapeFamily::Polygon => ShapeType::Polygon,
        }
    }

    /// The family able to store a geometry, `None` for geometry collections.
    pub fn of(geometry: &Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Point(_) => Some(ShapeFamily::Point),
            Geometry::MultiPoint(_) => Some(ShapeFamily::MultiPoint),
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                Some(ShapeFamily::PolyLine)
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => Some(ShapeFamily::Polygon),
            Geometry::GeometryCollection(_) => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeFamily::Point => "point",
            ShapeFamily::MultiPoint => "multipoint",
            ShapeFamily::PolyLine => "polyline",
            ShapeFamily::Polygon => "polygon",
        }
    }
}
