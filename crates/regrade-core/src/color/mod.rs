//! Colour space conversion between 8-bit-scaled RGB and normalized HSL.

pub mod hsl;

pub use hsl::{Hsla, hsl_to_rgb, hue_to_rgb, rgb_to_hsl};
