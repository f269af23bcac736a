//! Error types for buffer construction.
//!
//! The colour math itself never fails; only malformed buffers do.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("pixel count {len} does not match {width}x{height}")]
    DimensionMismatch { width: u32, height: u32, len: usize },
    #[error("RGBA byte length {len} is not a multiple of 4")]
    ByteLength { len: usize },
}
