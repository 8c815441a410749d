//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::preview::parse_color;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [pipeline] section
    if let Some(section) = ini.section(Some("pipeline")) {
        if let Some(v) = section.get("target_crs") {
            let v = v.trim();
            config.pipeline.target_crs = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = section.get("destination") {
            let v = v.trim();
            config.pipeline.destination = (!v.is_empty()).then(|| expand_tilde(v));
        }
    }

    // [preview] section
    if let Some(section) = ini.section(Some("preview")) {
        let preview = &mut config.preview;
        if let Some(v) = parse_number(section, "width", "must be a positive integer (pixels)")? {
            preview.width = v;
        }
        if let Some(v) = parse_number(section, "height", "must be a positive integer (pixels)")? {
            preview.height = v;
        }
        if let Some(v) = parse_number(section, "padding", "must be a non-negative integer (pixels)")? {
            preview.padding = v;
        }
        if let Some(v) = parse_number::<f32>(section, "stroke_width", "must be a positive number")? {
            if !(v.is_finite() && v > 0.0) {
                return Err(invalid("stroke_width", &v.to_string(), "must be a positive number"));
            }
            preview.stroke_width = v;
        }
        if let Some(v) = parse_color_key(section, "stroke_color")? {
            preview.stroke_color = v;
        }
        if let Some(v) = parse_color_key(section, "background")? {
            preview.background = v;
        }
        if preview.width == 0 || preview.height == 0 {
            return Err(invalid(
                "width",
                &format!("{}x{}", preview.width, preview.height),
                "canvas must not be empty",
            ));
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn parse_number<T: FromStr>(
    section: &Properties,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, v, reason)),
    }
}

fn parse_color_key(
    section: &Properties,
    key: &str,
) -> Result<Option<crate::preview::Rgba8>, ConfigFileError> {
    match section.get(key).map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_color(v)
            .map(Some)
            .ok_or_else(|| invalid(key, v, "expected a color like '#1f4e9c' or '#1f4e9c80'")),
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: "preview".to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_overlays_values_on_defaults() {
        let config = load(
            r#"
[pipeline]
target_crs = EPSG:3857
destination = /data/out

[preview]
width = 400
stroke_color = #ff0000
"#,
        )
        .unwrap();

        assert_eq!(config.pipeline.target_crs.as_deref(), Some("EPSG:3857"));
        assert_eq!(config.pipeline.destination, Some(PathBuf::from("/data/out")));
        assert_eq!(config.preview.width, 400);
        assert_eq!(config.preview.height, 600);
        assert_eq!(config.preview.stroke_color, (255, 0, 0, 255));
    }

    #[test]
    fn test_blank_values_clear_optionals() {
        let config = load("[pipeline]\ntarget_crs =\ndestination =\n").unwrap();
        assert!(config.pipeline.target_crs.is_none());
        assert!(config.pipeline.destination.is_none());
    }

    #[test]
    fn test_invalid_width() {
        let err = load("[preview]\nwidth = wide\n").unwrap_err();
        assert!(err.to_string().contains("preview.width"));
    }

    #[test]
    fn test_zero_canvas_rejected() {
        assert!(load("[preview]\nheight = 0\n").is_err());
    }

    #[test]
    fn test_invalid_color() {
        let err = load("[preview]\nbackground = blue\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "background"));
    }

    #[test]
    fn test_negative_stroke_rejected() {
        assert!(load("[preview]\nstroke_width = -1\n").is_err());
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs/a.log"), home.join("logs/a.log"));
        }
    }
}
