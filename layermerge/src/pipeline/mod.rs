//! The reproject-and-merge pipeline.
//!
//! ```text
//! PipelineRequest → load sources → resolve CRS → merge → preview | export
//!                      20%            40%         60%        80%      → 100%
//! ```
//!
//! A [`PipelineRequest`] is built fresh for each user action and handed to
//! [`PipelineOrchestrator::run`]. The orchestrator reports milestones to a
//! [`ProgressSink`] and a final [`PipelineStatus`] to a [`StatusSink`].
//!
//! # Example
//!
//! ```no_run
//! use layermerge::pipeline::{PipelineOrchestrator, PipelineRequest, PipelineStatus};
//!
//! let orchestrator = PipelineOrchestrator::new();
//! let request = PipelineRequest::export(
//!     vec!["roads.shp".into(), "rivers.shp".into()],
//!     "EPSG:3857",
//!     "/tmp/merged",
//! );
//! let progress = |percent: u8| println!("{}%", percent);
//! let status = |status: &PipelineStatus| println!("{:?}", status);
//! orchestrator.run(&request, &progress, &status)?;
//! # Ok::<(), layermerge::pipeline::PipelineError>(())
//! ```

mod error;
mod guard;
mod orchestrator;
mod progress;
mod request;
mod state;

pub use error::PipelineError;
pub use orchestrator::{PipelineOrchestrator, PipelineOutcome};
pub use progress::{milestones, PipelineStatus, ProgressSink, Silent, StatusSink};
pub use request::{result_dir, PipelineMode, PipelineRequest, OUTPUT_FILE, RESULT_DIR};
pub use state::PipelineState;
