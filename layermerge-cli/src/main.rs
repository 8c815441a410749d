//! layermerge CLI - reproject and merge shapefiles from the command line.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::{config, crs, export, inspect, preview};
use error::CliError;

#[derive(Parser)]
#[command(name = "layermerge")]
#[command(version = layermerge::VERSION)]
#[command(about = "Reproject shapefiles onto one CRS and merge them", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge shapefiles into <DEST>/Result/output.shp
    Export(export::ExportArgs),

    /// Merge shapefiles and render a PNG preview without exporting
    Preview(preview::PreviewArgs),

    /// Show feature count, geometry types, CRS and fields of a shapefile
    Inspect {
        /// Shapefile to inspect
        file: std::path::PathBuf,
    },

    /// List known CRS codes, or show the definition of one
    Crs {
        /// EPSG code, PROJ string or WKT
        code: Option<String>,
    },

    /// Manage ~/.layermerge/config.ini
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Export(args) => export::run(args, cli.verbose),
        Commands::Preview(args) => preview::run(args, cli.verbose),
        Commands::Inspect { file } => inspect::run(&file),
        Commands::Crs { code } => crs::run(code.as_deref()),
        Commands::Config(command) => config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
