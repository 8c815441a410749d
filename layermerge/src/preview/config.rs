//! Preview rendering configuration.

/// An RGBA color.
pub type Rgba8 = (u8, u8, u8, u8);

/// Configuration for [`PreviewRenderer`](super::PreviewRenderer).
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewConfig {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Empty margin kept on every side, in pixels
    pub padding: u32,
    /// Outline width in pixels
    pub stroke_width: f32,
    /// Outline color
    pub stroke_color: Rgba8,
    /// Canvas color
    pub background: Rgba8,
    /// Radius of the circle drawn for each point, in pixels
    pub point_radius: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            padding: 20,
            stroke_width: 1.0,
            stroke_color: (0x1f, 0x4e, 0x9c, 255),
            background: (255, 255, 255, 255),
            point_radius: 3.0,
        }
    }
}

impl PreviewConfig {
    /// Set the canvas size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the padding.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (the `#` is optional).
pub fn parse_color(text: &str) -> Option<Rgba8> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some((channel(0)?, channel(2)?, channel(4)?, alpha))
}

/// Format a color as `#rrggbb`, or `#rrggbbaa` when not opaque.
pub fn format_color(color: Rgba8) -> String {
    let (r, g, b, a) = color;
    if a == 255 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}
