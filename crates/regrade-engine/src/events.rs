//! Notifications produced by one pipeline tick.

use std::fmt;

/// Monotonic identifier of a submitted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened during a [`crate::GradingPipeline::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A new run was handed to the worker pool.
    RunSubmitted(RunId),
    /// A run's output and histogram were swapped into the published slot.
    RunPublished(RunId),
    /// A published run's deferred overlay draw executed.
    OverlayDrawn(RunId),
}
