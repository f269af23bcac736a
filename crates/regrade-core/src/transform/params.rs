//! Slider parameters that define the colour transform.
//!
//! `ColorParams` is the single value the kernel reads. The UI owns it and
//! hands an immutable snapshot to every run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::transform::remap::MIDPOINT;

/// Identifies one of the seven scalar sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    Hue,
    Saturation,
    Lightness,
    Red,
    Green,
    Blue,
    HueBandShift,
}

impl ParamId {
    /// Stable machine name, as used on the wire and on the command line.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Lightness => "lightness",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::HueBandShift => "hue_band_shift",
        }
    }

    /// Human-readable label for slider captions and status text.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
            Self::Lightness => "Lightness",
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::HueBandShift => "Hue band shift",
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: [ParamId; 7] = [
            ParamId::Hue,
            ParamId::Saturation,
            ParamId::Lightness,
            ParamId::Red,
            ParamId::Green,
            ParamId::Blue,
            ParamId::HueBandShift,
        ];
        &ALL
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a parameter name does not match any [`ParamId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter `{0}`")]
pub struct UnknownParam(pub String);

impl FromStr for ParamId {
    type Err = UnknownParam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|id| id.name() == normalized)
            .ok_or_else(|| UnknownParam(s.to_string()))
    }
}

/// Which slider values feed the per-channel bias remap.
///
/// Two inconsistent versions of this stage were observed. Both are kept so
/// the choice is explicit rather than silently "fixed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelBias {
    /// `red` drives both bounds of the remap for all three channels.
    #[default]
    SharedRed,
    /// `red` drives the upper bound; each channel's own slider drives the
    /// lower bound.
    PerChannelLow,
}

impl ChannelBias {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SharedRed => "shared-red",
            Self::PerChannelLow => "per-channel",
        }
    }
}

impl FromStr for ChannelBias {
    type Err = UnknownParam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "shared-red" => Ok(Self::SharedRed),
            "per-channel" | "per-channel-low" => Ok(Self::PerChannelLow),
            _ => Err(UnknownParam(s.to_string())),
        }
    }
}

/// Every slider writes here; the kernel reads a snapshot per run.
///
/// All scalars are in `[0, 1]` with `0.5` as the no-op midpoint. Callers are
/// expected to pass pre-clamped values; see [`ColorParams::sanitized`] for
/// untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorParams {
    /// Hue rotation. `1.0` rotates by half a turn, `0.0` by minus half.
    pub hue: f32,
    /// Saturation remap (upper bound 3).
    pub saturation: f32,
    /// Lightness remap (upper bound 300).
    pub lightness: f32,
    /// Red channel bias.
    pub red: f32,
    /// Green channel bias. Only read in [`ChannelBias::PerChannelLow`].
    pub green: f32,
    /// Blue channel bias. Only read in [`ChannelBias::PerChannelLow`].
    pub blue: f32,
    /// Shift applied inside the selective band.
    pub hue_band_shift: f32,
    /// Skip all colour computation and copy the source through.
    pub bypass: bool,
    /// Channel bias variant.
    pub bias_mode: ChannelBias,
}

impl Default for ColorParams {
    /// Produces an identity (no-op) transform.
    fn default() -> Self {
        Self {
            hue: MIDPOINT,
            saturation: MIDPOINT,
            lightness: MIDPOINT,
            red: MIDPOINT,
            green: MIDPOINT,
            blue: MIDPOINT,
            hue_band_shift: MIDPOINT,
            bypass: false,
            bias_mode: ChannelBias::default(),
        }
    }
}

impl ColorParams {
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Hue => self.hue,
            ParamId::Saturation => self.saturation,
            ParamId::Lightness => self.lightness,
            ParamId::Red => self.red,
            ParamId::Green => self.green,
            ParamId::Blue => self.blue,
            ParamId::HueBandShift => self.hue_band_shift,
        }
    }

    pub fn set(&mut self, id: ParamId, value: f32) {
        let slot = match id {
            ParamId::Hue => &mut self.hue,
            ParamId::Saturation => &mut self.saturation,
            ParamId::Lightness => &mut self.lightness,
            ParamId::Red => &mut self.red,
            ParamId::Green => &mut self.green,
            ParamId::Blue => &mut self.blue,
            ParamId::HueBandShift => &mut self.hue_band_shift,
        };
        *slot = value;
    }

    /// Put one slider back at its midpoint.
    pub fn reset(&mut self, id: ParamId) {
        self.set(id, MIDPOINT);
    }

    /// True when every slider sits at the midpoint. Ignores `bypass`.
    pub fn is_neutral(&self) -> bool {
        ParamId::all().iter().all(|&id| self.get(id) == MIDPOINT)
    }

    /// Clamp every slider into `[0, 1]`, replacing NaN with the midpoint.
    pub fn sanitized(mut self) -> Self {
        for &id in ParamId::all() {
            let v = self.get(id);
            let v = if v.is_nan() { MIDPOINT } else { v.clamp(0.0, 1.0) };
            self.set(id, v);
        }
        self
    }
}
