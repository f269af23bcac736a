//! Message contracts between the grading engine and a UI front-end.
//!
//! Messages travel as one JSON object per line and use the
//! `#[serde(tag = "type", content = "data")]` layout.

use serde::{Deserialize, Serialize};

use regrade_core::scopes::HistogramData;
use regrade_core::transform::params::ColorParams;

/// Messages from the engine to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineToUi {
    /// Initial state sync when the UI connects.
    Initialize {
        params: ColorParams,
        /// Dimensions of the loaded image, if any.
        image: Option<(u32, u32)>,
    },

    /// Parameters changed on the engine side (reset, bypass toggle).
    ParamsUpdated { params: ColorParams },

    /// A new source image replaced the previous one.
    ImageLoaded {
        path: String,
        width: u32,
        height: u32,
    },

    /// A run's output and histogram are now the displayed ones.
    RunPublished {
        run: u64,
        histogram: HistogramData,
        bypass: bool,
    },

    /// The histogram overlay for a published run, as base64 RGBA8.
    Overlay {
        run: u64,
        width: u32,
        height: u32,
        rgba_base64: String,
    },

    /// The published output was written to disk.
    Exported { path: String },

    /// Something the UI asked for failed.
    Error { message: String },
}

/// Messages from the UI to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToEngine {
    /// Request a fresh snapshot of engine state.
    RequestState,

    /// Replace every parameter at once.
    SetParams { params: ColorParams },

    /// Move one slider. `name` is a parameter name such as `"hue"`.
    SetParam { name: String, value: f32 },

    /// Put one slider back at its midpoint.
    ResetParam { name: String },

    /// All sliders back to the midpoint.
    ResetGrade,

    ToggleBypass,

    SetBypass { bypass: bool },

    /// Load a new source image.
    LoadImage { path: String },

    /// Write the published output (or its overlay) to disk.
    Export {
        path: String,
        #[serde(default)]
        overlay: bool,
    },

    /// Stop the bridge.
    Quit,
}
