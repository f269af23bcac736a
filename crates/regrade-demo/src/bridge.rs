//! Line-oriented IPC bridge between the grading engine and a UI process.
//!
//! The UI writes one `UiToEngine` JSON object per line to stdin; the
//! engine answers with `EngineToUi` lines on stdout. Stdin is read on a
//! dedicated thread running a current-thread tokio runtime, and lines are
//! forwarded over an mpsc channel to the frame loop, which owns the
//! pipeline.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use regrade_core::transform::params::{ParamId, UnknownParam};
use regrade_engine::{GradingPipeline, PipelineEvent};

use crate::config::AppConfig;
use crate::image_loader;
use crate::ipc::{EngineToUi, UiToEngine};

/// Outbound messages queued during one frame.
///
/// Handlers queue via `send()`; the frame loop drains and writes them.
#[derive(Debug, Default)]
pub struct OutboundMessages {
    messages: Vec<EngineToUi>,
}

impl OutboundMessages {
    pub fn send(&mut self, msg: EngineToUi) {
        self.messages.push(msg);
    }

    pub fn drain(&mut self) -> Vec<EngineToUi> {
        std::mem::take(&mut self.messages)
    }
}

/// Whether the frame loop should keep going after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("failed to write to stdout: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize message: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error(transparent)]
    UnknownParam(#[from] UnknownParam),
    #[error("{label} must be within [0, 1], got {value}")]
    OutOfRange { label: &'static str, value: f32 },
}

/// The pipeline plus the messages it owes the UI.
pub struct Bridge {
    pipeline: GradingPipeline,
    outbound: OutboundMessages,
}

impl Bridge {
    pub fn new(pipeline: GradingPipeline) -> Self {
        Self {
            pipeline,
            outbound: OutboundMessages::default(),
        }
    }

    pub fn pipeline(&self) -> &GradingPipeline {
        &self.pipeline
    }

    pub fn drain(&mut self) -> Vec<EngineToUi> {
        self.outbound.drain()
    }

    /// Parse one inbound line and apply it. Malformed lines are logged
    /// and reported back, never fatal.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        match serde_json::from_str::<UiToEngine>(line) {
            Ok(msg) => self.handle(msg),
            Err(e) => {
                let err = BridgeError::Malformed(e);
                tracing::warn!("{err}");
                self.error(err.to_string());
                Flow::Continue
            }
        }
    }

    pub fn handle(&mut self, msg: UiToEngine) -> Flow {
        match msg {
            UiToEngine::RequestState => self.send_snapshot(),
            UiToEngine::SetParams { params } => {
                self.pipeline.set_params(params.sanitized());
            }
            UiToEngine::SetParam { name, value } => match name.parse::<ParamId>() {
                Ok(id) if !(0.0..=1.0).contains(&value) => {
                    let err = BridgeError::OutOfRange {
                        label: id.label(),
                        value,
                    };
                    self.error(err.to_string());
                }
                Ok(id) => {
                    let bypass_was_on = self.pipeline.params().bypass;
                    if self.pipeline.set_param(id, value) && bypass_was_on {
                        self.send_params();
                    }
                }
                Err(e) => self.error(BridgeError::from(e).to_string()),
            },
            UiToEngine::ResetParam { name } => match name.parse::<ParamId>() {
                Ok(id) => {
                    if self.pipeline.reset_param(id) {
                        self.send_params();
                    }
                }
                Err(e) => self.error(BridgeError::from(e).to_string()),
            },
            UiToEngine::ResetGrade => {
                if self.pipeline.reset_grade() {
                    self.send_params();
                }
            }
            UiToEngine::ToggleBypass => {
                self.pipeline.toggle_bypass();
                self.send_params();
            }
            UiToEngine::SetBypass { bypass } => {
                if self.pipeline.set_bypass(bypass) {
                    self.send_params();
                }
            }
            UiToEngine::LoadImage { path } => self.load_image(Path::new(&path)),
            UiToEngine::Export { path, overlay } => self.export(PathBuf::from(path), overlay),
            UiToEngine::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Advance the pipeline one frame and report what happened.
    pub fn tick(&mut self) {
        for event in self.pipeline.tick() {
            self.report(event);
        }
    }

    pub fn load_image(&mut self, path: &Path) {
        match image_loader::load_image(path) {
            Ok(image) => {
                let (width, height) = image.dimensions();
                self.pipeline.load_image(image);
                self.outbound.send(EngineToUi::ImageLoaded {
                    path: path.display().to_string(),
                    width,
                    height,
                });
            }
            Err(e) => {
                tracing::error!("{e}");
                self.error(e.to_string());
            }
        }
    }

    pub fn send_snapshot(&mut self) {
        let image = self.pipeline.source().map(|s| s.dimensions());
        self.outbound.send(EngineToUi::Initialize {
            params: *self.pipeline.params(),
            image,
        });
    }

    /// Bring the pipeline up to date, then write the output or overlay.
    fn export(&mut self, path: PathBuf, overlay: bool) {
        for event in self.pipeline.settle() {
            self.report(event);
        }

        let target = if overlay {
            self.pipeline.overlay().map(|(_, image)| image)
        } else {
            self.pipeline.output()
        };
        let Some(image) = target else {
            self.error("nothing to export: no run has been published".to_string());
            return;
        };

        match image_loader::save_image(&path, image) {
            Ok(()) => {
                tracing::info!("exported {}", path.display());
                self.outbound.send(EngineToUi::Exported {
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                tracing::error!("{e}");
                self.error(e.to_string());
            }
        }
    }

    fn report(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::RunSubmitted(_) => {}
            PipelineEvent::RunPublished(id) => {
                if let Some(run) = self.pipeline.published() {
                    self.outbound.send(EngineToUi::RunPublished {
                        run: id.0,
                        histogram: run.histogram.as_ref().clone(),
                        bypass: run.params.bypass,
                    });
                }
            }
            PipelineEvent::OverlayDrawn(id) => {
                if let Some((_, image)) = self.pipeline.overlay() {
                    self.outbound.send(EngineToUi::Overlay {
                        run: id.0,
                        width: image.width(),
                        height: image.height(),
                        rgba_base64: base64::engine::general_purpose::STANDARD
                            .encode(image.as_bytes()),
                    });
                }
            }
        }
    }

    fn send_params(&mut self) {
        self.outbound.send(EngineToUi::ParamsUpdated {
            params: *self.pipeline.params(),
        });
    }

    fn error(&mut self, message: String) {
        self.outbound.send(EngineToUi::Error { message });
    }
}

/// Run the bridge until the UI sends `Quit`, or closes stdin and all
/// outstanding work has been reported.
pub fn run(config: &AppConfig, initial_image: Option<&Path>) -> Result<(), BridgeError> {
    let mut bridge = Bridge::new(GradingPipeline::with_slow_run_threshold(
        config.slow_run_threshold,
    ));
    if let Some(path) = initial_image {
        bridge.load_image(path);
    }
    bridge.send_snapshot();

    let mut inbound = spawn_stdin_reader();
    let mut stdin_open = true;
    let stdout = std::io::stdout();

    tracing::info!("bridge ready");
    loop {
        let mut flow = Flow::Continue;
        while stdin_open && flow == Flow::Continue {
            match inbound.try_recv() {
                Ok(line) => flow = bridge.handle_line(&line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::debug!("stdin closed");
                    stdin_open = false;
                }
            }
        }

        if flow == Flow::Continue {
            bridge.tick();
        }

        let mut out = stdout.lock();
        for msg in bridge.drain() {
            serde_json::to_writer(&mut out, &msg).map_err(BridgeError::Serialize)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        drop(out);

        if flow == Flow::Quit || (!stdin_open && bridge.pipeline().is_idle()) {
            break;
        }
        std::thread::sleep(config.tick_interval);
    }

    tracing::info!("bridge stopped");
    Ok(())
}

/// Spawn the stdin reader on a dedicated thread.
///
/// The returned channel disconnects when stdin reaches EOF.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("failed to build tokio runtime for stdin bridge: {e}");
                return;
            }
        };

        rt.block_on(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("stdin read failed: {e}");
                        break;
                    }
                }
            }
        });
    });

    rx
}
