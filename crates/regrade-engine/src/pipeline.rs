//! Run orchestration: submit, supersede, publish, and deferred overlay draw.
//!
//! Every parameter or image change marks the pipeline dirty. [`submit`]
//! cancels whatever run is still in flight and starts a new one on the
//! rayon pool. Results come back through a single-slot mailbox and are
//! only published if they belong to the latest run; anything older is
//! dropped. Publication is a swap of `Arc`s, never an in-place write.
//!
//! The overlay draw is deferred: publishing a run schedules it, and
//! [`flush_draws`] executes it later unless the run was superseded first.
//!
//! [`submit`]: GradingPipeline::submit
//! [`flush_draws`]: GradingPipeline::flush_draws

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use regrade_core::image::ImageBuffer;
use regrade_core::kernel;
use regrade_core::scopes::HistogramData;
use regrade_core::scopes::overlay;
use regrade_core::transform::params::{ColorParams, ParamId};

use crate::cancel::CancellationToken;
use crate::events::{PipelineEvent, RunId};
use crate::state::GradingState;
use crate::stats::PipelineStats;

/// The run currently owned by the worker pool.
struct InFlight {
    id: RunId,
    token: CancellationToken,
}

/// Output of a run that finished without being cancelled.
struct CompletedRun {
    id: RunId,
    params: ColorParams,
    output: ImageBuffer,
    histogram: HistogramData,
    kernel_time: Duration,
    histogram_time: Duration,
}

/// Mailbox between workers and the owning thread.
#[derive(Default)]
struct Mailbox {
    slot: Mutex<Option<CompletedRun>>,
    ready: Condvar,
}

/// Overlay render scheduled by a publish, cancelled by supersession.
struct DeferredDraw {
    id: RunId,
    token: CancellationToken,
    histogram: Arc<HistogramData>,
}

/// The most recently published run.
#[derive(Debug, Clone)]
pub struct PublishedRun {
    pub id: RunId,
    /// Parameter snapshot the run used.
    pub params: ColorParams,
    pub output: Arc<ImageBuffer>,
    pub histogram: Arc<HistogramData>,
}

/// Owns the source image, the grading state, and the run lifecycle.
pub struct GradingPipeline {
    state: GradingState,
    source: Option<Arc<ImageBuffer>>,
    next_id: u64,
    in_flight: Option<InFlight>,
    mailbox: Arc<Mailbox>,
    published: Option<PublishedRun>,
    pending_draw: Option<DeferredDraw>,
    overlay: Option<(RunId, Arc<ImageBuffer>)>,
    stats: PipelineStats,
}

impl Default for GradingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl GradingPipeline {
    pub fn new() -> Self {
        Self::with_stats(PipelineStats::default())
    }

    /// Create a pipeline with a custom slow-run logging threshold.
    pub fn with_slow_run_threshold(threshold: Duration) -> Self {
        Self::with_stats(PipelineStats::with_threshold(threshold))
    }

    fn with_stats(stats: PipelineStats) -> Self {
        Self {
            state: GradingState::default(),
            source: None,
            next_id: 0,
            in_flight: None,
            mailbox: Arc::new(Mailbox::default()),
            published: None,
            pending_draw: None,
            overlay: None,
            stats,
        }
    }

    // ── Inputs ──────────────────────────────────────────────────────

    /// Replace the source image wholesale.
    pub fn load_image(&mut self, image: ImageBuffer) {
        tracing::info!("source image loaded ({}x{})", image.width(), image.height());
        self.source = Some(Arc::new(image));
        self.state.dirty = true;
    }

    /// Replace all parameters. Returns whether anything changed.
    pub fn set_params(&mut self, params: ColorParams) -> bool {
        self.state.replace(params)
    }

    /// Move one slider; turns bypass off when the value changes.
    pub fn set_param(&mut self, id: ParamId, value: f32) -> bool {
        self.state.set_slider(id, value)
    }

    /// Put one slider back at its midpoint.
    pub fn reset_param(&mut self, id: ParamId) -> bool {
        self.state.set_slider(id, regrade_core::transform::remap::MIDPOINT)
    }

    /// All sliders back to the midpoint, bypass off.
    pub fn reset_grade(&mut self) -> bool {
        self.state.reset_sliders()
    }

    pub fn set_bypass(&mut self, bypass: bool) -> bool {
        self.state.set_bypass(bypass)
    }

    /// Flip bypass. Returns the new value.
    pub fn toggle_bypass(&mut self) -> bool {
        let bypass = !self.state.params.bypass;
        self.state.set_bypass(bypass);
        bypass
    }

    // ── Run lifecycle ───────────────────────────────────────────────

    /// Start a run if anything changed and an image is loaded.
    ///
    /// Cancels the in-flight run and any pending overlay draw first.
    /// Without a usable image the pipeline stays dirty, so the run happens
    /// as soon as one is loaded.
    pub fn submit(&mut self) -> Option<RunId> {
        if !self.state.dirty {
            return None;
        }

        let Some(source) = self.source.as_ref().filter(|s| !s.is_empty()).cloned() else {
            tracing::debug!("run skipped: no image loaded");
            return None;
        };

        self.supersede();

        self.next_id += 1;
        let id = RunId(self.next_id);
        let token = CancellationToken::new();
        let params = self.state.params;
        let mailbox = Arc::clone(&self.mailbox);
        let worker_token = token.clone();

        rayon::spawn(move || execute_run(id, &source, params, &worker_token, &mailbox));

        tracing::debug!(
            "run {id} submitted (bypass={}, bias={})",
            params.bypass,
            params.bias_mode.name()
        );
        self.in_flight = Some(InFlight { id, token });
        self.state.dirty = false;
        self.stats.submitted += 1;
        Some(id)
    }

    /// Non-blocking: publish the current run if it has finished.
    pub fn try_consume(&mut self) -> Option<RunId> {
        let completed = self.mailbox.slot.lock().take()?;
        self.publish(completed)
    }

    /// Block until the current run finishes, then publish it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub fn wait(&mut self) -> Option<RunId> {
        let target = self.in_flight.as_ref()?.id;
        let completed = {
            let mut slot = self.mailbox.slot.lock();
            loop {
                match slot.take() {
                    Some(run) if run.id == target => break run,
                    _ => self.mailbox.ready.wait(&mut slot),
                }
            }
        };
        self.publish(completed)
    }

    /// Execute the pending overlay draw unless its run was superseded.
    ///
    /// Returns whether an overlay was drawn.
    pub fn flush_draws(&mut self) -> bool {
        let Some(draw) = self.pending_draw.take() else {
            return false;
        };
        if draw.token.is_cancelled() {
            tracing::debug!("overlay draw for run {} cancelled", draw.id);
            return false;
        }
        let image = overlay::render(&draw.histogram);
        self.overlay = Some((draw.id, Arc::new(image)));
        true
    }

    /// One frame of the owning loop: submit, consume, then draw.
    pub fn tick(&mut self) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        if let Some(id) = self.submit() {
            events.push(PipelineEvent::RunSubmitted(id));
        }
        if let Some(id) = self.try_consume() {
            events.push(PipelineEvent::RunPublished(id));
        }
        if let Some(id) = self.pending_draw.as_ref().map(|d| d.id)
            && self.flush_draws()
        {
            events.push(PipelineEvent::OverlayDrawn(id));
        }
        events
    }

    /// Like [`tick`](Self::tick), but blocks until any pending work has
    /// been published and drawn.
    pub fn settle(&mut self) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        if let Some(id) = self.submit() {
            events.push(PipelineEvent::RunSubmitted(id));
        }
        if let Some(id) = self.wait() {
            events.push(PipelineEvent::RunPublished(id));
        }
        if let Some(id) = self.pending_draw.as_ref().map(|d| d.id)
            && self.flush_draws()
        {
            events.push(PipelineEvent::OverlayDrawn(id));
        }
        events
    }

    /// Submit, wait, and draw in one call. Returns the run that was
    /// published, if any. For one-shot use.
    pub fn run_blocking(&mut self) -> Option<RunId> {
        self.settle().into_iter().find_map(|event| match event {
            PipelineEvent::RunPublished(id) => Some(id),
            _ => None,
        })
    }

    fn supersede(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.token.cancel();
            self.stats.superseded += 1;
            tracing::debug!("run {} superseded", previous.id);
        }
        if let Some(draw) = self.pending_draw.take() {
            draw.token.cancel();
        }
    }

    fn publish(&mut self, completed: CompletedRun) -> Option<RunId> {
        let current = self.in_flight.as_ref().map(|run| run.id);
        if current != Some(completed.id) {
            tracing::debug!("discarding stale run {}", completed.id);
            return None;
        }
        let in_flight = self.in_flight.take()?;

        let CompletedRun {
            id,
            params,
            output,
            histogram,
            kernel_time,
            histogram_time,
        } = completed;

        let histogram = Arc::new(histogram);
        self.published = Some(PublishedRun {
            id,
            params,
            output: Arc::new(output),
            histogram: Arc::clone(&histogram),
        });
        self.pending_draw = Some(DeferredDraw {
            id,
            token: in_flight.token,
            histogram,
        });
        self.stats.record_published(kernel_time, histogram_time);
        Some(id)
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn params(&self) -> &ColorParams {
        &self.state.params
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    /// Whether a run has been submitted but not yet published.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True when nothing is in flight, no draw is pending, and no change is
    /// waiting to run. A change with no usable image does not count.
    pub fn is_idle(&self) -> bool {
        let runnable = self.state.dirty && self.source.as_ref().is_some_and(|s| !s.is_empty());
        !self.is_busy() && self.pending_draw.is_none() && !runnable
    }

    pub fn source(&self) -> Option<&Arc<ImageBuffer>> {
        self.source.as_ref()
    }

    pub fn published(&self) -> Option<&PublishedRun> {
        self.published.as_ref()
    }

    pub fn output(&self) -> Option<&Arc<ImageBuffer>> {
        self.published.as_ref().map(|run| &run.output)
    }

    pub fn histogram(&self) -> Option<&Arc<HistogramData>> {
        self.published.as_ref().map(|run| &run.histogram)
    }

    /// The latest drawn overlay and the run it belongs to.
    pub fn overlay(&self) -> Option<(RunId, &Arc<ImageBuffer>)> {
        self.overlay.as_ref().map(|(id, image)| (*id, image))
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }
}

impl Drop for GradingPipeline {
    fn drop(&mut self) {
        if let Some(run) = self.in_flight.take() {
            run.token.cancel();
        }
    }
}

/// Worker body: kernel pass, histogram pass, then post to the mailbox.
///
/// Checks the token before posting so a superseded run never lands.
fn execute_run(
    id: RunId,
    source: &ImageBuffer,
    params: ColorParams,
    token: &CancellationToken,
    mailbox: &Mailbox,
) {
    let kernel_start = Instant::now();
    let Some(output) = kernel::apply_cancellable(source, &params, || token.is_cancelled()) else {
        tracing::debug!("run {id} abandoned during kernel pass");
        return;
    };
    let kernel_time = kernel_start.elapsed();

    let histogram_start = Instant::now();
    let Some(histogram) = HistogramData::compute(&output) else {
        return;
    };
    let histogram_time = histogram_start.elapsed();

    let mut slot = mailbox.slot.lock();
    if token.is_cancelled() {
        tracing::debug!("run {id} abandoned before publish");
        return;
    }
    if slot.as_ref().is_some_and(|newer| newer.id > id) {
        return;
    }
    *slot = Some(CompletedRun {
        id,
        params,
        output,
        histogram,
        kernel_time,
        histogram_time,
    });
    mailbox.ready.notify_all();
}
