//! Per-run timing and supersession counters.

use std::time::{Duration, Instant};

/// Default duration above which a published run is logged at `info`.
pub const DEFAULT_SLOW_RUN_THRESHOLD: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Runs handed to the worker pool.
    pub submitted: u64,
    /// Runs whose output reached the display.
    pub published: u64,
    /// Runs cancelled because a newer one was submitted.
    pub superseded: u64,
    /// Kernel duration of the last published run.
    pub last_kernel_time: Duration,
    /// Histogram duration of the last published run.
    pub last_histogram_time: Duration,
    /// Runs at least this slow are always logged.
    pub slow_run_threshold: Duration,
    last_log_at: Instant,
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_SLOW_RUN_THRESHOLD)
    }
}

impl PipelineStats {
    pub fn with_threshold(slow_run_threshold: Duration) -> Self {
        Self {
            submitted: 0,
            published: 0,
            superseded: 0,
            last_kernel_time: Duration::ZERO,
            last_histogram_time: Duration::ZERO,
            slow_run_threshold,
            last_log_at: Instant::now(),
        }
    }

    /// Record a published run. Logs when slow, or at most once a second.
    pub(crate) fn record_published(&mut self, kernel_time: Duration, histogram_time: Duration) {
        self.published += 1;
        self.last_kernel_time = kernel_time;
        self.last_histogram_time = histogram_time;

        let total = kernel_time + histogram_time;
        if total >= self.slow_run_threshold || self.last_log_at.elapsed().as_secs_f32() >= 1.0 {
            tracing::info!(
                "run published: kernel {:.2}ms, histogram {:.2}ms (run #{}, {} superseded)",
                kernel_time.as_secs_f64() * 1000.0,
                histogram_time.as_secs_f64() * 1000.0,
                self.published,
                self.superseded
            );
            self.last_log_at = Instant::now();
        }
    }
}
