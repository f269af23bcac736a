//! Whole-image application of the per-pixel transform.
//!
//! Pixels have no cross-dependency, so the pass runs row-parallel on the
//! rayon pool when the `parallel` feature is enabled and sequentially
//! otherwise. Both paths produce identical output.
//!
//! A run is atomic: the output buffer is only returned once every row has
//! been written. A cancelled run returns `None` and its partial buffer is
//! dropped.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::image::ImageBuffer;
use crate::transform::evaluate::evaluate_pixel;
use crate::transform::params::ColorParams;

/// Apply `params` to every pixel of `source`.
///
/// Returns `None` when `source` has a zero dimension (no image loaded yet).
/// With `params.bypass` set the result is a plain copy of `source`.
pub fn apply(source: &ImageBuffer, params: &ColorParams) -> Option<ImageBuffer> {
    apply_cancellable(source, params, || false)
}

/// Like [`apply`], but polls `is_cancelled` once per row and gives up with
/// `None` as soon as it reports true.
pub fn apply_cancellable<F>(
    source: &ImageBuffer,
    params: &ColorParams,
    is_cancelled: F,
) -> Option<ImageBuffer>
where
    F: Fn() -> bool + Sync,
{
    if source.is_empty() {
        tracing::debug!("kernel skipped: source image is empty");
        return None;
    }

    if params.bypass {
        return (!is_cancelled()).then(|| source.clone());
    }

    let width = source.width() as usize;
    let mut output = source.clone();

    let finished = transform_rows(source, output.pixels_mut(), width, params, &is_cancelled);

    // The last rows may have finished after a late cancel; re-check so a
    // superseded run never hands back a buffer.
    if !finished || is_cancelled() {
        return None;
    }
    Some(output)
}

#[cfg(feature = "parallel")]
fn transform_rows<F>(
    source: &ImageBuffer,
    dst: &mut [crate::image::Pixel],
    width: usize,
    params: &ColorParams,
    is_cancelled: &F,
) -> bool
where
    F: Fn() -> bool + Sync,
{
    let src = source.pixels();
    dst.par_chunks_mut(width)
        .enumerate()
        .try_for_each(|(y, row)| {
            if is_cancelled() {
                return Err(());
            }
            let src_row = &src[y * width..(y + 1) * width];
            for (out, &px) in row.iter_mut().zip(src_row) {
                *out = evaluate_pixel(px, params);
            }
            Ok(())
        })
        .is_ok()
}

#[cfg(not(feature = "parallel"))]
fn transform_rows<F>(
    source: &ImageBuffer,
    dst: &mut [crate::image::Pixel],
    width: usize,
    params: &ColorParams,
    is_cancelled: &F,
) -> bool
where
    F: Fn() -> bool + Sync,
{
    let src = source.pixels();
    for (y, row) in dst.chunks_mut(width).enumerate() {
        if is_cancelled() {
            return false;
        }
        let src_row = &src[y * width..(y + 1) * width];
        for (out, &px) in row.iter_mut().zip(src_row) {
            *out = evaluate_pixel(px, params);
        }
    }
    true
}
