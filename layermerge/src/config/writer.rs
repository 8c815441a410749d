//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;
use crate::preview::format_color;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let target_crs = config.pipeline.target_crs.as_deref().unwrap_or("");
    let destination = config
        .pipeline
        .destination
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();
    let preview = &config.preview;

    format!(
        r#"[pipeline]
; CRS used when --crs is not given: an EPSG code (EPSG:3857), a PROJ string
; (+proj=utm +zone=33 +datum=WGS84) or WKT. Leave empty to require --crs.
target_crs = {}
; Directory used when --dest is not given. Output goes to <destination>/Result/
destination = {}

[preview]
; Canvas size in pixels
width = {}
height = {}
; Margin kept around the drawing, in pixels
padding = {}
; Outline width in pixels
stroke_width = {}
; Colors as #rrggbb or #rrggbbaa
stroke_color = {}
background = {}

[logging]
; Log file, cleared at the start of each run
file = {}
"#,
        target_crs,
        destination,
        preview.width,
        preview.height,
        preview.padding,
        preview.stroke_width,
        format_color(preview.stroke_color),
        format_color(preview.background),
        path_to_string(&config.logging.file),
    )
}

/// Display a path, abbreviating the home directory as `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
