//! `.shp` decoding and `.shp`/`.shx` encoding.

use geo::{
    Area, Contains, Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon, Winding,
};

use super::bytes::ByteReader;
use super::error::ShapefileError;
use super::types::{ShapeFamily, ShapeType};

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;
const HEADER_LEN: usize = 100;
const RECORD_HEADER_LEN: usize = 8;
const POINT_LEN: usize = 16;
const BBOX_LEN: usize = 32;

/// Decoded `.shp` content: the header shape type and one entry per record,
/// `None` for null shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ShpContents {
    pub shape_type: ShapeType,
    pub shapes: Vec<Option<Geometry<f64>>>,
}

/// Encoded `.shp` and matching `.shx` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShpEncoded {
    pub shp: Vec<u8>,
    pub shx: Vec<u8>,
}

/// Decode a complete `.shp` file.
///
/// Z and M values are skipped. Polygon rings are grouped into polygons by
/// orientation: clockwise rings are shells, counter-clockwise rings are
/// holes of the smallest shell containing them.
pub fn read_shp(bytes: &[u8]) -> Result<ShpContents, ShapefileError> {
    let mut header = ByteReader::new(bytes, ".shp header");
    let file_code = header.i32_be()?;
    if file_code != FILE_CODE {
        return Err(ShapefileError::InvalidFileCode(file_code));
    }
    header.skip(20)?;
    let declared_words = header.i32_be()?;
    let _version = header.i32_le()?;
    let type_code = header.i32_le()?;
    header.skip(64)?;

    let shape_type =
        ShapeType::from_code(type_code).ok_or(ShapefileError::UnsupportedShapeType(type_code))?;
    if shape_type == ShapeType::MultiPatch {
        return Err(ShapefileError::UnsupportedShapeType(type_code));
    }

    // Some writers get the declared length wrong; never read past either end.
    let declared_len = usize::try_from(declared_words).unwrap_or(0) * 2;
    let end = if declared_len >= HEADER_LEN {
        declared_len.min(bytes.len())
    } else {
        bytes.len()
    };

    let mut reader = ByteReader::new(&bytes[..end], ".shp record");
    reader.seek(HEADER_LEN)?;

    let mut shapes = Vec::new();
    while reader.remaining() >= RECORD_HEADER_LEN {
        let index = shapes.len();
        let _number = reader.i32_be()?;
        let content_words = reader.i32_be()?;
        let content_len = usize::try_from(content_words)
            .ok()
            .filter(|len| *len >= 2)
            .ok_or_else(|| ShapefileError::record(index, "invalid content length"))?
            * 2;
        let content = reader.take(content_len)?;
        shapes.push(read_shape(content, shape_type, index)?);
    }

    Ok(ShpContents { shape_type, shapes })
}

fn read_shape(
    content: &[u8],
    file_type: ShapeType,
    index: usize,
) -> Result<Option<Geometry<f64>>, ShapefileError> {
    let mut r = ByteReader::new(content, ".shp record");
    let code = r.i32_le()?;
    let shape_type = ShapeType::from_code(code).ok_or(ShapefileError::UnsupportedShapeType(code))?;
    if shape_type == ShapeType::Null {
        return Ok(None);
    }
    let family = shape_type
        .family()
        .ok_or(ShapefileError::UnsupportedShapeType(code))?;
    if file_type.family().is_some_and(|f| f != family) {
        return Err(ShapefileError::record(
            index,
            format!("{} shape in a {} file", shape_type, file_type),
        ));
    }

    match family {
        ShapeFamily::Point => {
            let x = r.f64_le()?;
            let y = r.f64_le()?;
            Ok(Some(Geometry::Point(Point::new(x, y))))
        }
        ShapeFamily::MultiPoint => {
            r.skip(BBOX_LEN)?;
            let count = read_count(&mut r, index, "point count")?;
            let coords = read_coords(&mut r, count)?;
            if coords.is_empty() {
                return Ok(None);
            }
            Ok(Some(Geometry::MultiPoint(MultiPoint::new(
                coords.into_iter().map(Point::from).collect(),
            ))))
        }
        ShapeFamily::PolyLine | ShapeFamily::Polygon => {
            r.skip(BBOX_LEN)?;
            let num_parts = read_count(&mut r, index, "part count")?;
            let num_points = read_count(&mut r, index, "point count")?;
            let mut starts = Vec::with_capacity(num_parts.min(r.remaining() / 4));
            for _ in 0..num_parts {
                starts.push(read_count(&mut r, index, "part index")?);
            }
            let coords = read_coords(&mut r, num_points)?;
            if num_parts == 0 || num_points == 0 {
                return Ok(None);
            }
            let parts = split_parts(coords, &starts, index)?;

            if family == ShapeFamily::PolyLine {
                let mut lines: Vec<LineString<f64>> =
                    parts.into_iter().map(LineString::new).collect();
                if lines.len() == 1 {
                    Ok(lines.pop().map(Geometry::LineString))
                } else {
                    Ok(Some(Geometry::MultiLineString(MultiLineString::new(lines))))
                }
            } else {
                Ok(Some(assemble_polygons(
                    parts.into_iter().map(LineString::new).collect(),
                )))
            }
        }
    }
}

fn read_count(
    r: &mut ByteReader<'_>,
    index: usize,
    what: &str,
) -> Result<usize, ShapefileError> {
    let value = r.i32_le()?;
    usize::try_from(value)
        .map_err(|_| ShapefileError::record(index, format!("negative {}: {}", what, value)))
}

fn read_coords(r: &mut ByteReader<'_>, count: usize) -> Result<Vec<Coord<f64>>, ShapefileError> {
    let mut coords = Vec::with_capacity(count.min(r.remaining() / POINT_LEN));
    for _ in 0..count {
        let x = r.f64_le()?;
        let y = r.f64_le()?;
        coords.push(Coord { x, y });
    }
    Ok(coords)
}

fn split_parts(
    coords: Vec<Coord<f64>>,
    starts: &[usize],
    index: usize,
) -> Result<Vec<Vec<Coord<f64>>>, ShapefileError> {
    if starts.first() != Some(&0) {
        return Err(ShapefileError::record(index, "first part does not start at 0"));
    }
    if starts.windows(2).any(|w| w[0] >= w[1]) || starts.iter().any(|s| *s >= coords.len()) {
        return Err(ShapefileError::record(index, "part indices out of order"));
    }

    let mut parts = Vec::with_capacity(starts.len());
    for (i, start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(coords.len());
        parts.push(coords[*start..end].to_vec());
    }
    Ok(parts)
}

fn assemble_polygons(rings: Vec<LineString<f64>>) -> Geometry<f64> {
    let (mut shells, mut holes): (Vec<_>, Vec<_>) = rings.into_iter().partition(|r| !r.is_ccw());

    // All rings counter-clockwise: the writer ignored orientation, treat them as shells.
    if shells.is_empty() {
        std::mem::swap(&mut shells, &mut holes);
    }

    let outlines: Vec<Polygon<f64>> = shells
        .iter()
        .map(|shell| Polygon::new(shell.clone(), vec![]))
        .collect();
    let mut interiors: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];

    for hole in holes {
        let owner = outlines
            .iter()
            .enumerate()
            .filter(|(_, outline)| hole.0.iter().any(|c| outline.contains(c)))
            .min_by(|(_, a), (_, b)| a.unsigned_area().total_cmp(&b.unsigned_area()))
            .map(|(i, _)| i);
        match owner {
            Some(i) => interiors[i].push(hole),
            None => {
                shells.push(hole);
                interiors.push(Vec::new());
            }
        }
    }

    let mut polygons: Vec<Polygon<f64>> = shells
        .into_iter()
        .zip(interiors)
        .map(|(shell, holes)| Polygon::new(shell, holes))
        .collect();

    if polygons.len() == 1 {
        if let Some(polygon) = polygons.pop() {
            return Geometry::Polygon(polygon);
        }
    }
    Geometry::MultiPolygon(MultiPolygon::new(polygons))
}

/// Encode shapes as `.shp` and `.shx` bytes.
///
/// Every non-null geometry must belong to the family of `shape_type`.
pub fn encode_shp(
    shape_type: ShapeType,
    shapes: &[Option<&Geometry<f64>>],
) -> Result<ShpEncoded, ShapefileError> {
    let family = shape_type
        .family()
        .ok_or(ShapefileError::UnsupportedShapeType(shape_type.code()))?;

    let mut records = Vec::new();
    let mut index = Vec::with_capacity(shapes.len() * RECORD_HEADER_LEN);
    let mut extent: Option<Extent> = None;

    for (i, shape) in shapes.iter().enumerate() {
        let content = match shape {
            Some(geometry) => encode_shape(geometry, shape_type, family, i)?,
            None => None,
        };
        let content = match content {
            Some((bytes, shape_extent)) => {
                extent = Some(match extent {
                    Some(e) => e.union(&shape_extent),
                    None => shape_extent,
                });
                bytes
            }
            None => ShapeType::Null.code().to_le_bytes().to_vec(),
        };

        let offset = words(HEADER_LEN + records.len())?;
        let content_words = words(content.len())?;
        let number = i32::try_from(i + 1)
            .map_err(|_| ShapefileError::TooLarge("too many records".to_string()))?;

        records.extend_from_slice(&number.to_be_bytes());
        records.extend_from_slice(&content_words.to_be_bytes());
        records.extend_from_slice(&content);

        index.extend_from_slice(&offset.to_be_bytes());
        index.extend_from_slice(&content_words.to_be_bytes());
    }

    let extent = extent.unwrap_or_default();

    let mut shp = file_header(shape_type, HEADER_LEN + records.len(), &extent)?;
    shp.extend_from_slice(&records);

    let mut shx = file_header(shape_type, HEADER_LEN + index.len(), &extent)?;
    shx.extend_from_slice(&index);

    Ok(ShpEncoded { shp, shx })
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    fn of(coords: impl IntoIterator<Item = Coord<f64>>) -> Option<Self> {
        coords.into_iter().fold(None, |acc, c| {
            Some(match acc {
                None => Extent {
                    min_x: c.x,
                    min_y: c.y,
                    max_x: c.x,
                    max_y: c.y,
                },
                Some(e) => Extent {
                    min_x: e.min_x.min(c.x),
                    min_y: e.min_y.min(c.y),
                    max_x: e.max_x.max(c.x),
                    max_y: e.max_y.max(c.y),
                },
            })
        })
    }

    fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        for v in [self.min_x, self.min_y, self.max_x, self.max_y] {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
}

fn words(len: usize) -> Result<i32, ShapefileError> {
    i32::try_from(len / 2)
        .map_err(|_| ShapefileError::TooLarge("file exceeds the 2 GB shapefile limit".to_string()))
}

fn file_header(shape_type: ShapeType, file_len: usize, extent: &Extent) -> Result<Vec<u8>, ShapefileError> {
    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(&FILE_CODE.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&words(file_len)?.to_be_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&shape_type.code().to_le_bytes());
    extent.write(&mut out);
    // Z and M ranges
    out.extend_from_slice(&[0u8; 32]);
    Ok(out)
}

/// Encode one geometry; `None` when it has no coordinates and is written as a null shape.
fn encode_shape(
    geometry: &Geometry<f64>,
    shape_type: ShapeType,
    family: ShapeFamily,
    index: usize,
) -> Result<Option<(Vec<u8>, Extent)>, ShapefileError> {
    if ShapeFamily::of(geometry) != Some(family) {
        return Err(ShapefileError::record(
            index,
            format!("geometry does not fit a {} shapefile", family.name()),
        ));
    }

    let mut out = Vec::new();
    out.extend_from_slice(&shape_type.code().to_le_bytes());

    match geometry {
        Geometry::Point(point) => {
            out.extend_from_slice(&point.x().to_le_bytes());
            out.extend_from_slice(&point.y().to_le_bytes());
            let extent = Extent::of([point.0]).unwrap_or_default();
            Ok(Some((out, extent)))
        }
        Geometry::MultiPoint(points) => {
            let coords: Vec<Coord<f64>> = points.iter().map(|p| p.0).collect();
            let Some(extent) = Extent::of(coords.iter().copied()) else {
                return Ok(None);
            };
            extent.write(&mut out);
            out.extend_from_slice(&count(coords.len())?.to_le_bytes());
            write_coords(&mut out, &coords);
            Ok(Some((out, extent)))
        }
        _ => {
            let parts = if family == ShapeFamily::Polygon {
                polygon_rings(geometry)
            } else {
                line_parts(geometry)
            };
            let parts: Vec<Vec<Coord<f64>>> = parts.into_iter().filter(|p| !p.is_empty()).collect();
            let Some(extent) = Extent::of(parts.iter().flatten().copied()) else {
                return Ok(None);
            };

            extent.write(&mut out);
            out.extend_from_slice(&count(parts.len())?.to_le_bytes());
            let total: usize = parts.iter().map(Vec::len).sum();
            out.extend_from_slice(&count(total)?.to_le_bytes());
            let mut start = 0;
            for part in &parts {
                out.extend_from_slice(&count(start)?.to_le_bytes());
                start += part.len();
            }
            for part in &parts {
                write_coords(&mut out, part);
            }
            Ok(Some((out, extent)))
        }
    }
}

fn count(n: usize) -> Result<i32, ShapefileError> {
    i32::try_from(n).map_err(|_| ShapefileError::TooLarge(format!("{} vertices or parts", n)))
}

fn write_coords(out: &mut Vec<u8>, coords: &[Coord<f64>]) {
    for c in coords {
        out.extend_from_slice(&c.x.to_le_bytes());
        out.extend_from_slice(&c.y.to_le_bytes());
    }
}

fn line_parts(geometry: &Geometry<f64>) -> Vec<Vec<Coord<f64>>> {
    match geometry {
        Geometry::Line(line) => vec![vec![line.start, line.end]],
        Geometry::LineString(ls) => vec![ls.0.clone()],
        Geometry::MultiLineString(mls) => mls.iter().map(|ls| ls.0.clone()).collect(),
        _ => Vec::new(),
    }
}

/// Rings in shapefile orientation: shells clockwise, holes counter-clockwise.
fn polygon_rings(geometry: &Geometry<f64>) -> Vec<Vec<Coord<f64>>> {
    let polygons = match geometry {
        Geometry::Polygon(p) => vec![p.clone()],
        Geometry::MultiPolygon(mp) => mp.0.clone(),
        Geometry::Rect(r) => vec![r.to_polygon()],
        Geometry::Triangle(t) => vec![t.to_polygon()],
        _ => Vec::new(),
    };

    let mut rings = Vec::new();
    for polygon in polygons {
        let (mut exterior, interiors) = polygon.into_inner();
        exterior.make_cw_winding();
        rings.push(exterior.0);
        for mut hole in interiors {
            hole.make_ccw_winding();
            rings.push(hole.0);
        }
    }
    rings
}
