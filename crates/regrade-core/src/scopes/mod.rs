//! Scope computation: the RGB histogram and its overlay rendering.

pub mod histogram;
pub mod overlay;

pub use histogram::{BINS, Channel, HistogramData};
