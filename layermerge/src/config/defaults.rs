//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::preview::PreviewConfig;

/// Default log file (`~/.layermerge/layermerge.log`).
pub fn default_log_path() -> PathBuf {
    config_directory().join(crate::logging::default_log_file())
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            // Only ever set by --crs or the config file
            target_crs: None,
            destination: None,
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        let preview = PreviewConfig::default();
        Self {
            width: preview.width,
            height: preview.height,
            padding: preview.padding,
            stroke_width: preview.stroke_width,
            stroke_color: preview.stroke_color,
            background: preview.background,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_path(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            pipeline: PipelineSettings::default(),
            preview: PreviewSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}
