//! Transform pipeline: slider parameters, range remapping, and per-pixel evaluation.

pub mod evaluate;
pub mod params;
pub mod remap;
