//! Regrade Core — domain layer for interactive colour re-grading.
//!
//! This crate contains the colour math, the per-pixel transform, the
//! data-parallel kernel pass, and histogram computation. No scheduling or
//! I/O dependencies.

pub mod color;
pub mod error;
pub mod image;
pub mod kernel;
pub mod scopes;
pub mod transform;

// Re-exports for convenience.
pub use color::{Hsla, hsl_to_rgb, rgb_to_hsl};
pub use error::CoreError;
pub use image::{ImageBuffer, Pixel};
pub use scopes::HistogramData;
pub use transform::evaluate::evaluate_pixel;
pub use transform::params::{ChannelBias, ColorParams, ParamId, UnknownParam};
pub use transform::remap::{invlerp, lerp};
