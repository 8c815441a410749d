//! Configuration management CLI commands.
//!
//! `config path`, `config show` and `config init`.

use clap::Subcommand;
use layermerge::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration
    Show,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init { force } => run_init(force),
    }
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    print!("{}", render(&config));
    Ok(())
}

fn run_init(force: bool) -> Result<(), CliError> {
    let path = config_file_path();
    if path.exists() && !force {
        println!("Configuration already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }
    ConfigFile::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn render(config: &ConfigFile) -> String {
    let not_set = || "(not set)".to_string();
    let p = &config.preview;
    format!(
        "[pipeline]\n  target_crs = {}\n  destination = {}\n\n\
         [preview]\n  width = {}\n  height = {}\n  padding = {}\n  stroke_width = {}\n  \
         stroke_color = {}\n  background = {}\n\n\
         [logging]\n  file = {}\n",
        config.pipeline.target_crs.clone().unwrap_or_else(not_set),
        config
            .pipeline
            .destination
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(not_set),
        p.width,
        p.height,
        p.padding,
        p.stroke_width,
        layermerge::preview::format_color(p.stroke_color),
        layermerge::preview::format_color(p.background),
        config.logging.file.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let text = render(&ConfigFile::default());
        assert!(text.contains("target_crs = (not set)"));
        assert!(text.contains("destination = (not set)"));
        assert!(text.contains("stroke_color = #1f4e9c"));
    }
}
