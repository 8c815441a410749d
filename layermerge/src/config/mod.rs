//! User configuration stored in `~/.layermerge/config.ini`.
//!
//! Settings structs live in [`settings`], defaults in [`defaults`], INI
//! parsing in `parser` and serialization in `writer`. [`ConfigFile`] ties
//! them together.
//!
//! ```
//! use layermerge::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.preview.width, 800);
//! let preview = config.preview_config();
//! assert_eq!(preview.padding, 20);
//! ```

pub mod defaults;
mod file;
mod parser;
pub mod settings;
mod writer;

pub use defaults::default_log_path;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, LoggingSettings, PipelineSettings, PreviewSettings};
