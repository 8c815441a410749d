//! Sequences load, resolve, merge and render/export for one request.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;

use image::RgbaImage;
use tracing::{debug, error, info, warn};

use super::error::PipelineError;
use super::guard::RunGuard;
use super::progress::{milestones, PipelineStatus, ProgressSink, ProgressTracker, StatusSink};
use super::request::{result_dir, PipelineMode, PipelineRequest, OUTPUT_FILE};
use super::state::PipelineState;
use crate::crs::{CrsAction, CrsResolver};
use crate::feature::FeatureCollection;
use crate::layer;
use crate::merge::merge;
use crate::preview::{PreviewConfig, PreviewRenderer};

/// What a successful run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Features in the merged layer
    pub feature_count: usize,
    /// What the resolver did to each source, in request order
    pub actions: Vec<CrsAction>,
    /// Written layer, for exports
    pub output: Option<PathBuf>,
    /// Rendered preview, when one was asked for and could be drawn
    pub preview: Option<RgbaImage>,
}

/// Runs pipeline requests one at a time.
///
/// Stages run in sequence on the calling thread and stop at the first
/// failure. Nothing is rolled back: a failure while writing may leave a
/// partial layer behind. A second `run` while one is in flight is rejected
/// with [`PipelineError::AlreadyRunning`] rather than queued.
pub struct PipelineOrchestrator {
    renderer: PreviewRenderer,
    busy: AtomicBool,
    state: Mutex<PipelineState>,
}

impl Default for PipelineOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOrchestrator {
    pub fn new() -> Self {
        Self::with_preview_config(PreviewConfig::default())
    }

    pub fn with_preview_config(config: PreviewConfig) -> Self {
        Self {
            renderer: PreviewRenderer::new(config),
            busy: AtomicBool::new(false),
            state: Mutex::new(PipelineState::Idle),
        }
    }

    /// State of the current or most recent run.
    pub fn state(&self) -> PipelineState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Run a request to completion.
    ///
    /// Progress milestones go to `progress`; the terminal success message or
    /// failure reason goes to `status`. A request without sources is
    /// rejected before leaving [`PipelineState::Idle`].
    pub fn run(
        &self,
        request: &PipelineRequest,
        progress: &dyn ProgressSink,
        status: &dyn StatusSink,
    ) -> Result<PipelineOutcome, PipelineError> {
        let Some(_guard) = RunGuard::acquire(&self.busy) else {
            warn!("Rejected pipeline request: a run is in progress");
            return Err(self.reject(PipelineError::AlreadyRunning, status));
        };

        self.set_state(PipelineState::Idle);
        if request.sources.is_empty() {
            warn!("Rejected pipeline request: no sources");
            return Err(self.reject(PipelineError::NoSources, status));
        }

        let mut tracker = ProgressTracker::new(progress);
        match self.execute(request, &mut tracker) {
            Ok(outcome) => {
                self.set_state(PipelineState::Done);
                tracker.advance(milestones::DONE);
                status.report(&success_status(&outcome));
                Ok(outcome)
            }
            Err(e) => {
                let reason = e.to_string();
                error!(stage = %self.state(), %reason, "Pipeline failed");
                self.set_state(PipelineState::Failed(reason.clone()));
                status.report(&PipelineStatus::Failure { reason });
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        request: &PipelineRequest,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.set_state(PipelineState::LoadingSources);
        let mut collections = Vec::with_capacity(request.sources.len());
        for path in &request.sources {
            let collection = layer::load(path)?;
            debug!(
                path = %path.display(),
                crs = %collection.crs().map(|c| c.summary()).unwrap_or_else(|| "none".into()),
                "Source loaded"
            );
            collections.push(collection);
        }
        tracker.advance(milestones::LOADED);

        self.set_state(PipelineState::ResolvingCrs);
        let resolver = CrsResolver::new(&request.target_crs)?;
        let mut actions = Vec::with_capacity(collections.len());
        for (collection, path) in collections.iter_mut().zip(&request.sources) {
            let action = resolver.resolve_in_place(collection)?;
            debug!(path = %path.display(), %action, "CRS resolved");
            actions.push(action);
        }
        tracker.advance(milestones::RESOLVED);

        self.set_state(PipelineState::Merging);
        let merged = merge(collections)?;
        info!(
            sources = request.sources.len(),
            features = merged.len(),
            fields = merged.schema().len(),
            "Merged sources"
        );
        tracker.advance(milestones::MERGED);

        let mut outcome = PipelineOutcome {
            feature_count: merged.len(),
            actions,
            output: None,
            preview: None,
        };

        match &request.mode {
            PipelineMode::Preview => {
                self.set_state(PipelineState::Previewing);
                outcome.preview = Some(self.renderer.render(&merged)?);
            }
            PipelineMode::Export {
                destination,
                with_preview,
            } => {
                self.set_state(PipelineState::Exporting);
                let path = layer::write(&merged, &result_dir(destination), OUTPUT_FILE)?;
                info!(path = %path.display(), "Export complete");
                outcome.output = Some(path);
                if *with_preview {
                    outcome.preview = self.advisory_preview(&merged);
                }
            }
        }
        tracker.advance(milestones::PRODUCED);

        Ok(outcome)
    }

    /// Previews never fail an export.
    fn advisory_preview(&self, merged: &FeatureCollection) -> Option<RgbaImage> {
        match self.renderer.render(merged) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, "Skipping preview");
                None
            }
        }
    }

    fn reject(&self, error: PipelineError, status: &dyn StatusSink) -> PipelineError {
        status.report(&PipelineStatus::Failure {
            reason: error.to_string(),
        });
        error
    }

    fn set_state(&self, state: PipelineState) {
        match self.state.lock() {
            Ok(mut current) => *current = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }
}

fn success_status(outcome: &PipelineOutcome) -> PipelineStatus {
    let message = match &outcome.output {
        Some(path) => format!(
            "Exported {} features to {}",
            outcome.feature_count,
            path.display()
        ),
        None => format!("Previewed {} features", outcome.feature_count),
    };
    PipelineStatus::Success {
        message,
        output: outcome.output.clone(),
    }
}
