//! Grading state owned by the pipeline on behalf of the UI.

use regrade_core::transform::params::{ColorParams, ParamId};

/// The current parameters plus a dirty flag.
///
/// The dirty flag is raised by every change that should trigger a run and
/// lowered when a run is submitted.
#[derive(Debug, Clone)]
pub struct GradingState {
    /// The current parameters.
    pub params: ColorParams,
    /// Whether something changed since the last submitted run.
    pub dirty: bool,
}

impl Default for GradingState {
    fn default() -> Self {
        Self {
            params: ColorParams::default(),
            dirty: true,
        }
    }
}

impl GradingState {
    /// Replace the whole parameter set. Returns whether anything changed.
    pub fn replace(&mut self, params: ColorParams) -> bool {
        if self.params == params {
            return false;
        }
        self.params = params;
        self.dirty = true;
        true
    }

    /// Move one slider. Moving a slider also turns bypass off.
    pub fn set_slider(&mut self, id: ParamId, value: f32) -> bool {
        if self.params.get(id) == value {
            return false;
        }
        self.params.set(id, value);
        self.params.bypass = false;
        self.dirty = true;
        true
    }

    /// Every slider back to its midpoint, bypass off. Keeps the bias mode.
    pub fn reset_sliders(&mut self) -> bool {
        let defaults = ColorParams {
            bias_mode: self.params.bias_mode,
            ..ColorParams::default()
        };
        self.replace(defaults)
    }

    pub fn set_bypass(&mut self, bypass: bool) -> bool {
        if self.params.bypass == bypass {
            return false;
        }
        self.params.bypass = bypass;
        self.dirty = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_dirty() {
        assert!(GradingState::default().dirty);
    }

    #[test]
    fn test_replace_same_params_is_clean() {
        let mut state = GradingState::default();
        state.dirty = false;
        assert!(!state.replace(ColorParams::default()));
        assert!(!state.dirty);
    }

    #[test]
    fn test_slider_move_clears_bypass() {
        let mut state = GradingState::default();
        state.set_bypass(true);
        state.dirty = false;
        assert!(state.set_slider(ParamId::Saturation, 0.2));
        assert!(!state.params.bypass);
        assert!(state.dirty);
    }

    #[test]
    fn test_unchanged_slider_keeps_bypass() {
        let mut state = GradingState::default();
        state.set_bypass(true);
        assert!(!state.set_slider(ParamId::Hue, 0.5));
        assert!(state.params.bypass);
    }

    #[test]
    fn test_reset_keeps_bias_mode() {
        let mut state = GradingState::default();
        state.params.bias_mode = regrade_core::ChannelBias::PerChannelLow;
        state.params.hue = 0.1;
        state.params.bypass = true;
        assert!(state.reset_sliders());
        assert!(state.params.is_neutral());
        assert!(!state.params.bypass);
        assert_eq!(state.params.bias_mode, regrade_core::ChannelBias::PerChannelLow);
    }
}
