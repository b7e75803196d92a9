//! Visuomotor rotation between the raw input direction and the cursor
//!
//! The transform is polar around the start position: the raw distance is kept,
//! only the angle is shifted.
//!
//! - Sudden: fixed clockwise shift of the full magnitude
//! - Gradual: counter-clockwise ramp in `GRADUAL_STEPS` equal increments,
//!   one increment every `TRIALS_PER_STEP` completed trials

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GRADUAL_STEPS, TRIALS_PER_STEP};
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Gradual trial counter value on (re-)entering gradual mode
pub const GRADUAL_FIRST_ATTEMPT: u32 = 1;

/// Active rotation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PerturbationMode {
    #[default]
    Off,
    Sudden,
    Gradual,
}

impl PerturbationMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, PerturbationMode::Off)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerturbationMode::Off => "off",
            PerturbationMode::Sudden => "sudden",
            PerturbationMode::Gradual => "gradual",
        }
    }
}

/// Rotation state carried across trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationState {
    pub mode: PerturbationMode,
    /// Full rotation (radians)
    pub magnitude: f32,
    /// Completed trials since gradual mode was entered, starting at `GRADUAL_FIRST_ATTEMPT`
    pub gradual_attempts: u32,
}

impl PerturbationState {
    pub fn new(magnitude: f32) -> Self {
        Self {
            mode: PerturbationMode::Off,
            magnitude,
            gradual_attempts: GRADUAL_FIRST_ATTEMPT,
        }
    }

    /// Switch mode; the gradual ramp restarts only when gradual mode is entered
    pub fn set_mode(&mut self, mode: PerturbationMode) {
        if mode == PerturbationMode::Gradual && self.mode != PerturbationMode::Gradual {
            self.gradual_attempts = GRADUAL_FIRST_ATTEMPT;
        }
        self.mode = mode;
    }

    /// Count a completed trial toward the gradual ramp
    pub fn record_completed_trial(&mut self) {
        if self.mode == PerturbationMode::Gradual {
            self.gradual_attempts = self.gradual_attempts.saturating_add(1);
        }
    }

    /// Current ramp step, 0..=GRADUAL_STEPS
    pub fn gradual_step_index(&self) -> u32 {
        self.gradual_attempts
            .div_ceil(TRIALS_PER_STEP)
            .min(GRADUAL_STEPS)
    }

    /// Signed angle added to the raw angle (radians)
    ///
    /// Sudden subtracts while gradual adds; the two directions are kept as observed.
    pub fn shift(&self) -> f32 {
        match self.mode {
            PerturbationMode::Off => 0.0,
            PerturbationMode::Sudden => -self.magnitude,
            PerturbationMode::Gradual => {
                let per_step = self.magnitude / GRADUAL_STEPS as f32;
                self.gradual_step_index() as f32 * per_step
            }
        }
    }
}

/// Displayed angle for a raw input angle
#[inline]
pub fn perturb_angle(raw_angle: f32, state: &PerturbationState) -> f32 {
    raw_angle + state.shift()
}

/// Feedback cursor position for a raw input position
pub fn feedback_position(center: Vec2, raw: Vec2, state: &PerturbationState) -> Vec2 {
    if !state.mode.is_active() {
        return raw;
    }
    let (distance, raw_angle) = cartesian_to_polar(raw - center);
    center + polar_to_cartesian(distance, perturb_angle(raw_angle, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAGNITUDE: f32 = 30.0 * std::f32::consts::PI / 180.0;

    fn state(mode: PerturbationMode) -> PerturbationState {
        let mut state = PerturbationState::new(MAGNITUDE);
        state.set_mode(mode);
        state
    }

    #[test]
    fn test_off_is_identity() {
        let state = state(PerturbationMode::Off);
        let center = Vec2::new(100.0, 100.0);
        let raw = Vec2::new(140.0, 73.0);
        assert_eq!(feedback_position(center, raw, &state), raw);
        assert_eq!(perturb_angle(0.4, &state), 0.4);
    }

    #[test]
    fn test_sudden_rotates_clockwise_by_magnitude() {
        let state = state(PerturbationMode::Sudden);
        let out = perturb_angle(45f32.to_radians(), &state);
        assert!((out.to_degrees() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_gradual_rotates_the_other_way() {
        let mut state = state(PerturbationMode::Gradual);
        state.gradual_attempts = 30;
        let out = perturb_angle(45f32.to_radians(), &state);
        assert!((out.to_degrees() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_gradual_steps_every_three_trials() {
        let mut state = state(PerturbationMode::Gradual);
        let mut steps = Vec::new();
        for _ in 0..9 {
            steps.push(state.gradual_step_index());
            state.record_completed_trial();
        }
        assert_eq!(steps, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_gradual_ramp_restarts_on_reentry_only() {
        let mut state = state(PerturbationMode::Gradual);
        for _ in 0..7 {
            state.record_completed_trial();
        }
        assert_eq!(state.gradual_attempts, 8);

        // Staying in gradual keeps the ramp
        state.set_mode(PerturbationMode::Gradual);
        assert_eq!(state.gradual_attempts, 8);

        // Trials outside gradual mode do not count
        state.set_mode(PerturbationMode::Off);
        state.record_completed_trial();
        assert_eq!(state.gradual_attempts, 8);

        state.set_mode(PerturbationMode::Gradual);
        assert_eq!(state.gradual_attempts, GRADUAL_FIRST_ATTEMPT);
    }

    #[test]
    fn test_feedback_keeps_distance() {
        let state = state(PerturbationMode::Sudden);
        let center = Vec2::new(933.0, 600.0);
        let raw = center + Vec2::new(120.0, -160.0);
        let fb = feedback_position(center, raw, &state);
        assert!((fb.distance(center) - 200.0).abs() < 1e-3);
        let (_, raw_angle) = cartesian_to_polar(raw - center);
        let (_, fb_angle) = cartesian_to_polar(fb - center);
        let turned = crate::normalize_degrees((fb_angle - raw_angle).to_degrees());
        assert!((turned + MAGNITUDE.to_degrees()).abs() < 1e-2);
    }

    proptest! {
        #[test]
        fn prop_gradual_shift_monotonic_and_saturates(attempts in 0u32..200) {
            let mut a = state(PerturbationMode::Gradual);
            a.gradual_attempts = attempts;
            let mut b = a.clone();
            b.gradual_attempts = attempts + 1;
            prop_assert!(b.shift() >= a.shift());
            prop_assert!(a.shift() <= MAGNITUDE + 1e-6);
            if a.gradual_step_index() == GRADUAL_STEPS {
                prop_assert!((a.shift() - MAGNITUDE).abs() < 1e-5);
            }
        }

        #[test]
        fn prop_sudden_shift_constant(attempts in 0u32..500, raw in -3.0f32..3.0) {
            let mut s = state(PerturbationMode::Sudden);
            s.gradual_attempts = attempts;
            prop_assert_eq!(s.shift(), -MAGNITUDE);
            prop_assert!((perturb_angle(raw, &s) - (raw - MAGNITUDE)).abs() < 1e-5);
        }
    }
}
