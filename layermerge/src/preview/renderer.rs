//! Outline rendering of feature collections.

use std::path::{Path, PathBuf};

use geo::{Coord, Geometry, LineString, Polygon, Rect};
use image::RgbaImage;
use thiserror::Error;
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Shader, Stroke, Transform};
use tracing::debug;

use super::config::PreviewConfig;
use crate::feature::FeatureCollection;

/// Errors raised while rendering or saving a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Nothing to draw: no features, or only null geometries.
    #[error("Nothing to preview: the collection has no geometry")]
    EmptyGeometry,

    /// The configured canvas cannot hold a drawing.
    #[error("Invalid preview canvas {width}x{height} with padding {padding}")]
    InvalidCanvas { width: u32, height: u32, padding: u32 },

    /// The image could not be written.
    #[error("Failed to save preview to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Draws collections as unfilled outlines on a blank canvas.
///
/// The drawing is scaled uniformly so the combined bounding box of all
/// geometries fits inside the padded canvas, and centered. Y grows north.
#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    config: PreviewConfig,
}

impl PreviewRenderer {
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Render the collection. The collection is not modified.
    pub fn render(&self, collection: &FeatureCollection) -> Result<RgbaImage, PreviewError> {
        let bounds = collection
            .bounding_rect()
            .filter(|r| is_finite(r.min()) && is_finite(r.max()))
            .ok_or(PreviewError::EmptyGeometry)?;

        let config = &self.config;
        let invalid = || PreviewError::InvalidCanvas {
            width: config.width,
            height: config.height,
            padding: config.padding,
        };
        if config.width <= config.padding * 2 || config.height <= config.padding * 2 {
            return Err(invalid());
        }
        let mut pixmap = Pixmap::new(config.width, config.height).ok_or_else(invalid)?;

        let (r, g, b, a) = config.background;
        pixmap.fill(Color::from_rgba8(r, g, b, a));

        let (r, g, b, a) = config.stroke_color;
        let paint = Paint {
            shader: Shader::SolidColor(Color::from_rgba8(r, g, b, a)),
            anti_alias: true,
            ..Default::default()
        };
        let stroke = Stroke {
            width: config.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };

        let viewport = Viewport::fit(bounds, config);
        let mut drawn = 0usize;
        for geometry in collection.geometries() {
            let mut builder = PathBuilder::new();
            trace_geometry(&mut builder, geometry, &viewport, config.point_radius);
            if let Some(path) = builder.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                drawn += 1;
            }
        }

        debug!(
            geometries = drawn,
            width = config.width,
            height = config.height,
            "Rendered preview"
        );

        let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RgbaImage::from_raw(config.width, config.height, data).ok_or_else(invalid)
    }
}

/// Save a rendered preview; the format follows the file extension.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), PreviewError> {
    image.save(path).map_err(|source| PreviewError::Save {
        path: path.to_path_buf(),
        source,
    })
}

fn is_finite(c: Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

/// Maps data coordinates to pixel coordinates.
struct Viewport {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    fn fit(bounds: Rect<f64>, config: &PreviewConfig) -> Self {
        let padding = f64::from(config.padding);
        let available_w = f64::from(config.width) - 2.0 * padding;
        let available_h = f64::from(config.height) - 2.0 * padding;
        let span_x = bounds.width();
        let span_y = bounds.height();

        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (available_w / span_x).min(available_h / span_y),
            (true, false) => available_w / span_x,
            (false, true) => available_h / span_y,
            // A single location
            (false, false) => 1.0,
        };

        Self {
            min_x: bounds.min().x,
            max_y: bounds.max().y,
            scale,
            offset_x: padding + (available_w - span_x * scale) / 2.0,
            offset_y: padding + (available_h - span_y * scale) / 2.0,
        }
    }

    fn project(&self, c: Coord<f64>) -> (f32, f32) {
        let x = self.offset_x + (c.x - self.min_x) * self.scale;
        let y = self.offset_y + (self.max_y - c.y) * self.scale;
        (x as f32, y as f32)
    }
}

fn trace_geometry(builder: &mut PathBuilder, geometry: &Geometry<f64>, viewport: &Viewport, radius: f32) {
    match geometry {
        Geometry::Point(p) => trace_point(builder, p.0, viewport, radius),
        Geometry::MultiPoint(mp) => {
            for p in mp {
                trace_point(builder, p.0, viewport, radius);
            }
        }
        Geometry::Line(line) => trace_coords(builder, &[line.start, line.end], viewport, false),
        Geometry::LineString(ls) => trace_line(builder, ls, viewport, false),
        Geometry::MultiLineString(mls) => {
            for ls in mls {
                trace_line(builder, ls, viewport, false);
            }
        }
        Geometry::Polygon(polygon) => trace_polygon(builder, polygon, viewport),
        Geometry::MultiPolygon(mp) => {
            for polygon in mp {
                trace_polygon(builder, polygon, viewport);
            }
        }
        Geometry::Rect(rect) => trace_polygon(builder, &rect.to_polygon(), viewport),
        Geometry::Triangle(triangle) => trace_polygon(builder, &triangle.to_polygon(), viewport),
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                trace_geometry(builder, g, viewport, radius);
            }
        }
    }
}

fn trace_point(builder: &mut PathBuilder, c: Coord<f64>, viewport: &Viewport, radius: f32) {
    if is_finite(c) {
        let (x, y) = viewport.project(c);
        builder.push_circle(x, y, radius.max(0.5));
    }
}

fn trace_polygon(builder: &mut PathBuilder, polygon: &Polygon<f64>, viewport: &Viewport) {
    trace_line(builder, polygon.exterior(), viewport, true);
    for hole in polygon.interiors() {
        trace_line(builder, hole, viewport, true);
    }
}

fn trace_line(builder: &mut PathBuilder, line: &LineString<f64>, viewport: &Viewport, close: bool) {
    trace_coords(builder, &line.0, viewport, close);
}

fn trace_coords(builder: &mut PathBuilder, coords: &[Coord<f64>], viewport: &Viewport, close: bool) {
    let mut points = coords.iter().copied().filter(|c| is_finite(*c));
    let Some(first) = points.next() else {
        return;
    };
    let (x, y) = viewport.project(first);
    builder.move_to(x, y);
    for c in points {
        let (x, y) = viewport.project(c);
        builder.line_to(x, y);
    }
    if close {
        builder.close();
    }
}
