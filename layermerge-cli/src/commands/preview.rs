//! `layermerge preview`: merge sources and save a PNG, without exporting.

use std::path::PathBuf;

use clap::Args;
use layermerge::pipeline::PipelineRequest;

use super::common::{print_actions, print_status, progress_line, resolve_target_crs, CanvasArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Source shapefiles
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target CRS (EPSG code, PROJ string or WKT)
    #[arg(long)]
    pub crs: Option<String>,

    /// PNG file to write
    #[arg(long, short)]
    pub output: PathBuf,

    #[command(flatten)]
    pub canvas: CanvasArgs,
}

pub fn run(args: PreviewArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("preview");
    let config = runner.config();

    let request = PipelineRequest::preview(args.files, resolve_target_crs(args.crs, config));
    let orchestrator = runner.orchestrator(args.canvas.preview_config(config));
    let progress = |percent: u8| println!("{}", progress_line(percent));
    let outcome = orchestrator.run(&request, &progress, &print_status)?;
    print_actions(&request.sources, &outcome);

    match &outcome.preview {
        Some(image) => runner.save_preview(image, &args.output),
        None => Err(CliError::Usage("Preview run produced no image".to_string())),
    }
}
