//! Preview images of feature collections.
//!
//! Previews are a visual check only: the renderer draws every geometry as an
//! unfilled outline, fitted into a padded canvas with a uniform scale. The
//! result is an in-memory [`image::RgbaImage`]; showing or saving it is up to
//! the caller ([`save_image`] writes it to disk).
//!
//! ```ignore
//! use layermerge::preview::{PreviewConfig, PreviewRenderer};
//!
//! let renderer = PreviewRenderer::new(PreviewConfig::default().with_size(400, 300));
//! let image = renderer.render(&collection)?;
//! ```

mod config;
mod renderer;

pub use config::{format_color, parse_color, PreviewConfig, Rgba8};
pub use renderer::{save_image, PreviewError, PreviewRenderer};
