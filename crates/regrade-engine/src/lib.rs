//! Regrade Engine — run orchestration around the core kernel.
//!
//! Owns the source image and the current parameters, schedules kernel +
//! histogram runs on the rayon pool, supersedes stale runs, and publishes
//! results atomically. No UI or I/O dependencies.

pub mod cancel;
pub mod events;
pub mod pipeline;
pub mod state;
pub mod stats;

// Re-exports for downstream crates.
pub use cancel::CancellationToken;
pub use events::{PipelineEvent, RunId};
pub use pipeline::{GradingPipeline, PublishedRun};
pub use stats::PipelineStats;
