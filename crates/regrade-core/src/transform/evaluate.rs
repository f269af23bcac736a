//! The per-pixel colour transform. This is the kernel body.

use crate::color::{hsl_to_rgb, rgb_to_hsl};
use crate::image::Pixel;
use crate::transform::params::{ChannelBias, ColorParams};
use crate::transform::remap::{MIDPOINT, lerp, remap, remap_split};

/// Upper remap bound for the RGB channel bias.
pub const CHANNEL_CEILING: f32 = 1.0;
/// Upper remap bound for saturation.
pub const SATURATION_CEILING: f32 = 3.0;
/// Upper remap bound for lightness.
pub const LIGHTNESS_CEILING: f32 = 300.0;

/// Lower edge of the selective band, inclusive.
pub const BAND_START: f32 = 220.0 / 360.0;
/// Upper edge of the selective band, exclusive.
pub const BAND_END: f32 = 270.0 / 360.0;

/// Applies the complete grading chain to one pixel:
/// 1. Channel bias on the 0–255 RGB values
/// 2. RGB → HSL
/// 3. Selective band shift
/// 4. Hue rotation
/// 5. Saturation remap
/// 6. Lightness remap
/// 7. HSL → RGB, rounded and clamped
///
/// Alpha passes through every stage unchanged. With `bypass` set the input
/// pixel is returned as is.
pub fn evaluate_pixel(px: Pixel, params: &ColorParams) -> Pixel {
    if params.bypass {
        return px;
    }

    let [r, g, b] = apply_channel_bias(
        [f32::from(px.r), f32::from(px.g), f32::from(px.b)],
        params,
    );

    let mut hsl = rgb_to_hsl(r, g, b, f32::from(px.a));

    // The gate and the shift both act on the saturation component even
    // though the bounds are hue degrees. Kept literal.
    hsl.s = shift_band(hsl.s, params.hue_band_shift);

    hsl.h = rotate_hue(hsl.h, params.hue);
    hsl.s = remap(params.saturation, hsl.s, SATURATION_CEILING);
    hsl.l = remap(params.lightness, hsl.l, LIGHTNESS_CEILING);

    let [r, g, b, a] = hsl_to_rgb(hsl);
    Pixel::from_channels(r, g, b, a)
}

/// Step 1: two-sided remap of each RGB channel on the 0–255 scale.
///
/// The channel value is the interpolation amount, so away from the midpoint
/// it extrapolates well outside `[0, 255]`; the final write clamps.
pub fn apply_channel_bias(rgb: [f32; 3], params: &ColorParams) -> [f32; 3] {
    match params.bias_mode {
        ChannelBias::SharedRed => rgb.map(|c| remap(params.red, c, CHANNEL_CEILING)),
        ChannelBias::PerChannelLow => {
            let lower = [params.red, params.green, params.blue];
            std::array::from_fn(|i| remap_split(params.red, lower[i], rgb[i], CHANNEL_CEILING))
        }
    }
}

/// Step 3: shift `value` by `lerp(-0.5, 0.5, amount)` (mod 1) when it falls
/// inside `[BAND_START, BAND_END)`.
pub fn shift_band(value: f32, amount: f32) -> f32 {
    if (BAND_START..BAND_END).contains(&value) {
        (value + lerp(-0.5, 0.5, amount) + 1.0).rem_euclid(1.0)
    } else {
        value
    }
}

/// Step 4: rotate a hue fraction by `hue − 0.5` turns, wrapping into `[0, 1)`.
pub fn rotate_hue(h: f32, hue: f32) -> f32 {
    (h + (hue - MIDPOINT)).rem_euclid(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::params::ParamId;

    const EPSILON: f32 = 1e-5;

    fn assert_close(actual: Pixel, expected: Pixel, tolerance: u8) {
        let a = actual.to_array();
        let e = expected.to_array();
        for c in 0..4 {
            assert!(
                a[c].abs_diff(e[c]) <= tolerance,
                "channel {c}: {actual} vs {expected}"
            );
        }
    }

    #[test]
    fn test_bypass_returns_input() {
        let mut params = ColorParams::default();
        params.hue = 0.9;
        params.lightness = 0.0;
        params.bypass = true;
        let px = Pixel::new(12, 200, 99, 31);
        assert_eq!(evaluate_pixel(px, &params), px);
    }

    #[test]
    fn test_neutral_params_are_identity() {
        let params = ColorParams::default();
        for r in (0..=255u16).step_by(15) {
            for g in (0..=255u16).step_by(17) {
                for b in (0..=255u16).step_by(51) {
                    let px = Pixel::new(r as u8, g as u8, b as u8, 200);
                    assert_eq!(evaluate_pixel(px, &params), px);
                }
            }
        }
    }

    #[test]
    fn test_hue_one_turns_red_to_cyan() {
        let mut params = ColorParams::default();
        params.hue = 1.0;
        let out = evaluate_pixel(Pixel::new(255, 0, 0, 255), &params);
        assert_close(out, Pixel::new(0, 255, 255, 255), 1);
    }

    #[test]
    fn test_hue_zero_also_half_turn() {
        let mut params = ColorParams::default();
        params.hue = 0.0;
        let out = evaluate_pixel(Pixel::new(0, 255, 0, 255), &params);
        assert_close(out, Pixel::new(255, 0, 255, 255), 1);
    }

    #[test]
    fn test_saturation_zero_produces_gray() {
        let mut params = ColorParams::default();
        params.saturation = 0.0;
        let out = evaluate_pixel(Pixel::new(200, 40, 90, 255), &params);
        assert_eq!(out.r, out.g);
        assert_eq!(out.g, out.b);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn test_lightness_zero_is_black() {
        let mut params = ColorParams::default();
        params.lightness = 0.0;
        let out = evaluate_pixel(Pixel::new(200, 40, 90, 128), &params);
        assert_eq!(out, Pixel::new(0, 0, 0, 128));
    }

    #[test]
    fn test_red_bias_high_collapses_channels() {
        // At red = 1 both bounds are 1, so every channel becomes 1 on the
        // 0–255 scale.
        let mut params = ColorParams::default();
        params.red = 1.0;
        let out = evaluate_pixel(Pixel::new(10, 100, 250, 255), &params);
        assert_eq!(out, Pixel::new(1, 1, 1, 255));
    }

    #[test]
    fn test_shared_red_ignores_green_and_blue() {
        let mut params = ColorParams::default();
        params.set(ParamId::Green, 0.0);
        params.set(ParamId::Blue, 1.0);
        let px = Pixel::new(40, 80, 120, 255);
        assert_eq!(evaluate_pixel(px, &params), px);
    }

    #[test]
    fn test_per_channel_low_reads_own_slider() {
        let mut params = ColorParams::default();
        params.bias_mode = ChannelBias::PerChannelLow;
        params.green = 0.0;
        let biased = apply_channel_bias([40.0, 80.0, 120.0], &params);
        assert!((biased[0] - 40.0).abs() < EPSILON);
        assert!(biased[1].abs() < EPSILON);
        assert!((biased[2] - 120.0).abs() < EPSILON);
    }

    #[test]
    fn test_band_shift_only_inside_band() {
        assert_eq!(shift_band(0.3, 1.0), 0.3);
        assert_eq!(shift_band(BAND_END, 1.0), BAND_END);
        let inside = 0.65;
        assert!((shift_band(inside, MIDPOINT) - inside).abs() < EPSILON);
        assert!((shift_band(inside, 1.0) - 0.15).abs() < EPSILON);
        assert!((shift_band(inside, 0.0) - 0.15).abs() < EPSILON);
        assert!((shift_band(inside, 0.75) - 0.9).abs() < EPSILON);
    }

    #[test]
    fn test_band_shift_moves_matching_pixel() {
        // Saturation d / (max + min) ≈ 0.65 lands inside the band.
        let px = Pixel::new(165, 35, 35, 255);
        let hsl = rgb_to_hsl(165.0, 35.0, 35.0, 255.0);
        assert!((BAND_START..BAND_END).contains(&hsl.s), "s = {}", hsl.s);

        let mut params = ColorParams::default();
        params.hue_band_shift = 1.0;
        let out = evaluate_pixel(px, &params);
        assert_ne!(out, px);
        // Shift is applied to saturation only, so the pixel moves toward gray.
        assert!(out.r < px.r);
        assert!(out.g > px.g);
    }

    #[test]
    fn test_rotate_hue_wraps() {
        assert!((rotate_hue(0.9, 1.0) - 0.4).abs() < EPSILON);
        assert!((rotate_hue(0.1, 0.0) - 0.6).abs() < EPSILON);
        assert!((rotate_hue(0.25, MIDPOINT) - 0.25).abs() < EPSILON);
    }
}
