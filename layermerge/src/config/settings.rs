//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

use crate::preview::{PreviewConfig, Rgba8};

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Defaults for pipeline runs
    pub pipeline: PipelineSettings,
    /// Preview rendering
    pub preview: PreviewSettings,
    /// Logging
    pub logging: LoggingSettings,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// CRS used when a command is not given `--crs`
    pub target_crs: Option<String>,
    /// Destination used when a command is not given `--dest`
    pub destination: Option<PathBuf>,
}

/// `[preview]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSettings {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub stroke_width: f32,
    pub stroke_color: Rgba8,
    pub background: Rgba8,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// Renderer configuration from the `[preview]` settings.
    pub fn preview_config(&self) -> PreviewConfig {
        let p = &self.preview;
        PreviewConfig {
            width: p.width,
            height: p.height,
            padding: p.padding,
            stroke_width: p.stroke_width,
            stroke_color: p.stroke_color,
            background: p.background,
            ..PreviewConfig::default()
        }
    }
}
