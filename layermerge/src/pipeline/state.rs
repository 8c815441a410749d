//! Orchestrator states.

use std::fmt;

/// Where a run currently is.
///
/// `Idle → LoadingSources → ResolvingCrs → Merging → {Previewing | Exporting}
/// → Done`, or `Failed` from any state after `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    LoadingSources,
    ResolvingCrs,
    Merging,
    Previewing,
    Exporting,
    Done,
    /// The run stopped; holds the failure reason.
    Failed(String),
}

impl PipelineState {
    /// True for `Done` and `Failed`.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::LoadingSources => write!(f, "loading sources"),
            Self::ResolvingCrs => write!(f, "resolving CRS"),
            Self::Merging => write!(f, "merging"),
            Self::Previewing => write!(f, "rendering preview"),
            Self::Exporting => write!(f, "exporting"),
            Self::Done => write!(f, "done"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
