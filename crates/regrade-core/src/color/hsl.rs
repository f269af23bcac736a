//! RGB ↔ HSL conversion.
//!
//! RGB channels are on the 0–255 scale but kept as `f32` so intermediate
//! stages of the grading chain stay unrounded. HSL components are all in
//! `[0, 1]`; hue is a fraction of a full turn, not degrees.
//!
//! # Formula
//! ```text
//!   l = (max + min) / 2
//!   s = d / (2 − max − min)   if l > 0.5
//!       d / (max + min)       otherwise            (d = max − min)
//!   h = ((g − b) / d + (g < b ? 6 : 0)) / 6   if max == r
//!       ((b − r) / d + 2) / 6                 if max == g
//!       ((r − g) / d + 4) / 6                 if max == b
//! ```
//!
//! Achromatic inputs (`max == min`) resolve to `h = 0, s = 0` rather than
//! dividing by zero.

use serde::{Deserialize, Serialize};

/// Hue, saturation, lightness and alpha, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

/// Convert 0–255 RGBA channels to normalized HSLA.
pub fn rgb_to_hsl(r: f32, g: f32, b: f32, a: f32) -> Hsla {
    let r = r / 255.0;
    let g = g / 255.0;
    let b = b / 255.0;
    let a = a / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsla { h: 0.0, s: 0.0, l, a };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsla { h: h / 6.0, s, l, a }
}

/// Convert normalized HSLA back to 0–255 RGBA channels.
///
/// The result is not rounded or clamped; that happens once, when the final
/// pixel is written.
pub fn hsl_to_rgb(hsl: Hsla) -> [f32; 4] {
    let Hsla { h, s, l, a } = hsl;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };

    [r * 255.0, g * 255.0, b * 255.0, a * 255.0]
}

/// One channel of the HSL → RGB piecewise-linear hue ramp.
///
/// `t` is wrapped into `[0, 1]` by a single ±1 step, then:
/// ```text
///   [0,   1/6) → ramp up   p → q
///   [1/6, 1/2) → plateau   q
///   [1/2, 2/3) → ramp down q → p
///   otherwise  → plateau   p
/// ```
pub fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::{FromColor, Hsl, Srgb};

    const EPSILON: f32 = 1e-4;

    fn round_trip(rgb: [f32; 3]) -> [f32; 4] {
        hsl_to_rgb(rgb_to_hsl(rgb[0], rgb[1], rgb[2], 255.0))
    }

    #[test]
    fn test_primary_red() {
        let hsl = rgb_to_hsl(255.0, 0.0, 0.0, 255.0);
        assert!(hsl.h.abs() < EPSILON);
        assert!((hsl.s - 1.0).abs() < EPSILON);
        assert!((hsl.l - 0.5).abs() < EPSILON);
        assert!((hsl.a - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_primary_hues_are_thirds() {
        let green = rgb_to_hsl(0.0, 255.0, 0.0, 255.0);
        let blue = rgb_to_hsl(0.0, 0.0, 255.0, 255.0);
        assert!((green.h - 1.0 / 3.0).abs() < EPSILON);
        assert!((blue.h - 2.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_magenta_side_wraps_positive() {
        // g < b with red maximal takes the +6 branch.
        let hsl = rgb_to_hsl(255.0, 0.0, 128.0, 255.0);
        assert!(hsl.h > 0.8 && hsl.h < 1.0, "h = {}", hsl.h);
    }

    #[test]
    fn test_achromatic_has_zero_hue_and_saturation() {
        for v in [0.0, 64.0, 128.0, 255.0] {
            let hsl = rgb_to_hsl(v, v, v, 255.0);
            assert_eq!(hsl.h, 0.0);
            assert_eq!(hsl.s, 0.0);
            assert!((hsl.l - v / 255.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_zero_saturation_is_gray() {
        let rgb = hsl_to_rgb(Hsla { h: 0.7, s: 0.0, l: 0.25, a: 1.0 });
        for c in &rgb[..3] {
            assert!((c - 63.75).abs() < EPSILON);
        }
    }

    #[test]
    fn test_round_trip_reproduces_rgb() {
        let samples = [
            [255.0, 0.0, 0.0],
            [12.0, 200.0, 37.0],
            [250.0, 250.0, 1.0],
            [0.0, 0.0, 0.0],
            [128.0, 128.0, 128.0],
            [33.0, 66.0, 99.0],
            [201.0, 17.0, 240.0],
            [255.0, 254.0, 253.0],
        ];
        for rgb in samples {
            let out = round_trip(rgb);
            for c in 0..3 {
                assert!(
                    (out[c] - rgb[c]).abs() < 0.01,
                    "{rgb:?} channel {c}: {:.5}",
                    out[c]
                );
            }
            assert!((out[3] - 255.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_round_trip_grid() {
        for r in (0..=255).step_by(51) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(51) {
                    let rgb = [r as f32, g as f32, b as f32];
                    let out = round_trip(rgb);
                    for c in 0..3 {
                        assert!((out[c] - rgb[c]).abs() < 0.01, "{rgb:?} -> {out:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_alpha_carried_through() {
        let hsl = rgb_to_hsl(10.0, 20.0, 30.0, 77.0);
        let rgb = hsl_to_rgb(hsl);
        assert!((rgb[3] - 77.0).abs() < EPSILON);
    }

    #[test]
    fn test_hue_to_rgb_segments() {
        let (p, q) = (0.2, 0.8);
        assert!((hue_to_rgb(p, q, 0.0) - p).abs() < EPSILON);
        assert!((hue_to_rgb(p, q, 1.0 / 12.0) - 0.5).abs() < EPSILON);
        assert!((hue_to_rgb(p, q, 0.3) - q).abs() < EPSILON);
        assert!((hue_to_rgb(p, q, 0.9) - p).abs() < EPSILON);
        // Wrapped from below.
        assert!((hue_to_rgb(p, q, -0.7) - q).abs() < EPSILON);
    }

    #[test]
    fn test_matches_palette_hsl() {
        let samples = [[0.8_f32, 0.4, 0.2], [0.1, 0.6, 0.9], [0.3, 0.3, 0.7]];
        for [r, g, b] in samples {
            let ours = rgb_to_hsl(r * 255.0, g * 255.0, b * 255.0, 255.0);
            let theirs: Hsl = Hsl::from_color(Srgb::new(r, g, b));
            let hue = theirs.hue.into_positive_degrees() / 360.0;
            assert!((ours.h - hue).abs() < EPSILON, "hue {} vs {}", ours.h, hue);
            assert!((ours.s - theirs.saturation).abs() < EPSILON);
            assert!((ours.l - theirs.lightness).abs() < EPSILON);
        }
    }
}
