//! Linear interpolation primitives and the two-sided slider remap.
//!
//! Sliders report a value in `[0, 1]` whose midpoint `0.5` means "no
//! change". The remap turns that into a signed adjustment of a channel:
//!
//! ```text
//! remap(v, c, hi) = lerp(invlerp(0.5, hi, v), invlerp(0, 0.5, v), c)
//! ```
//!
//! At `v = 0.5` the two bounds are `0` and `1`, so the lerp returns `c`
//! unchanged. Below the midpoint the upper bound falls toward 0; above it
//! the lower bound rises toward `(1 − 0.5) / (hi − 0.5)`.

/// Slider value that leaves a channel untouched.
pub const MIDPOINT: f32 = 0.5;

/// `(1 − amt) × start + amt × end`. `amt` is not clamped.
#[inline]
pub fn lerp(start: f32, end: f32, amt: f32) -> f32 {
    (1.0 - amt) * start + amt * end
}

/// Inverse of [`lerp`]: where `amt` sits between `start` and `end`.
///
/// `amt` is clamped into the range first. A degenerate range
/// (`start == end`) returns `start` instead of dividing by zero.
#[inline]
pub fn invlerp(start: f32, end: f32, amt: f32) -> f32 {
    let amt = amt.max(start.min(end)).min(start.max(end));
    let range = end - start;
    if range == 0.0 {
        return start;
    }
    (amt - start) / range
}

/// Two-sided remap of channel `c` by slider value `v`, with upper bound `hi`.
#[inline]
pub fn remap(v: f32, c: f32, hi: f32) -> f32 {
    lerp(invlerp(MIDPOINT, hi, v), invlerp(0.0, MIDPOINT, v), c)
}

/// Two-sided remap with independent slider values for the two bounds.
///
/// `upper` drives the `[0.5, hi]` side, `lower` the `[0, 0.5]` side. With
/// `upper == lower` this is [`remap`].
#[inline]
pub fn remap_split(upper: f32, lower: f32, c: f32, hi: f32) -> f32 {
    lerp(invlerp(MIDPOINT, hi, upper), invlerp(0.0, MIDPOINT, lower), c)
}
