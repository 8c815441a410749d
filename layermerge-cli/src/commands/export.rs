//! `layermerge export`: merge sources and write a shapefile.

use std::path::PathBuf;

use clap::Args;
use layermerge::pipeline::PipelineRequest;

use super::common::{
    print_actions, print_status, progress_line, resolve_destination, resolve_target_crs,
    CanvasArgs,
};
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Source shapefiles, merged in the order given
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target CRS (EPSG code, PROJ string or WKT)
    #[arg(long)]
    pub crs: Option<String>,

    /// Destination directory; output goes to <DEST>/Result/output.shp
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Also render the merged layer to this PNG
    #[arg(long, value_name = "PATH")]
    pub preview_png: Option<PathBuf>,

    #[command(flatten)]
    pub canvas: CanvasArgs,
}

pub fn run(args: ExportArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("export");
    let config = runner.config();

    let destination = resolve_destination(args.dest, config)?;
    let target = resolve_target_crs(args.crs, config);
    let mut request = PipelineRequest::export(args.files, target, destination);
    if args.preview_png.is_some() {
        request = request.with_preview();
    }

    println!(
        "Merging {} layer(s) into {}",
        request.sources.len(),
        request.target_crs.summary()
    );
    let orchestrator = runner.orchestrator(args.canvas.preview_config(config));
    let progress = |percent: u8| println!("{}", progress_line(percent));
    let outcome = orchestrator.run(&request, &progress, &print_status)?;
    print_actions(&request.sources, &outcome);

    if let Some(path) = &args.preview_png {
        match &outcome.preview {
            Some(image) => runner.save_preview(image, path)?,
            None => eprintln!("Preview could not be rendered; see the log for details"),
        }
    }

    Ok(())
}
