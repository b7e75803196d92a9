//! Signed pointing error per completed trial
//!
//! One sample per hit or miss, in completion order. A trial that ran past the
//! time limit is recorded as `ErrorValue::Invalid` instead of a number.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::normalize_degrees;

/// How a trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Target shown, no geometric event yet
    Pending,
    /// Time limit passed; still waiting for a hit or miss
    TimedOut,
    Hit,
    Miss,
}

/// Recorded error, or the invalid marker for respond-late trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ErrorValue {
    /// Degrees in (-180, 180]; positive is clockwise on screen
    Degrees(f32),
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorSample {
    pub attempt_index: u32,
    pub error: ErrorValue,
}

impl ErrorSample {
    pub fn degrees(&self) -> Option<f32> {
        match self.error {
            ErrorValue::Degrees(d) => Some(d),
            ErrorValue::Invalid => None,
        }
    }
}

/// Everything needed to score a finished trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialOutcome {
    pub attempt_index: u32,
    pub outcome: Outcome,
    pub center: Vec2,
    pub target: Vec2,
    /// Cursor position at the hit or miss boundary
    pub feedback: Vec2,
    pub respond_late: bool,
}

/// Angle from target direction to cursor direction, degrees in (-180, 180]
pub fn signed_error_deg(center: Vec2, target: Vec2, feedback: Vec2) -> f32 {
    let to_target = target - center;
    let to_cursor = feedback - center;
    let target_angle = to_target.y.atan2(to_target.x);
    let end_angle = to_cursor.y.atan2(to_cursor.x);
    normalize_degrees((end_angle - target_angle).to_degrees())
}

/// Aggregate over the recorded samples
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ErrorSummary {
    pub count: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Mean absolute error over valid samples
    pub mean_abs_deg: Option<f32>,
}

/// Append-only error sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorRecorder {
    samples: Vec<ErrorSample>,
}

impl ErrorRecorder {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Score a completed trial and append the sample
    pub fn record(&mut self, trial: &TrialOutcome) -> ErrorSample {
        let error = if trial.respond_late {
            ErrorValue::Invalid
        } else {
            ErrorValue::Degrees(signed_error_deg(trial.center, trial.target, trial.feedback))
        };
        let sample = ErrorSample {
            attempt_index: trial.attempt_index,
            error,
        };
        self.samples.push(sample);
        sample
    }

    pub fn samples(&self) -> &[ErrorSample] {
        &self.samples
    }

    /// Ordered copy of the sequence for the output writer
    pub fn export(&self) -> Vec<ErrorSample> {
        self.samples.clone()
    }

    pub fn last(&self) -> Option<&ErrorSample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn summary(&self) -> ErrorSummary {
        let valid: Vec<f32> = self.samples.iter().filter_map(|s| s.degrees()).collect();
        let mean_abs_deg = if valid.is_empty() {
            None
        } else {
            Some(valid.iter().map(|d| d.abs()).sum::<f32>() / valid.len() as f32)
        };
        ErrorSummary {
            count: self.samples.len(),
            valid: valid.len(),
            invalid: self.samples.len() - valid.len(),
            mean_abs_deg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen_polar;
    use proptest::prelude::*;

    fn outcome(target: Vec2, feedback: Vec2, respond_late: bool) -> TrialOutcome {
        TrialOutcome {
            attempt_index: 0,
            outcome: Outcome::Hit,
            center: Vec2::ZERO,
            target,
            feedback,
            respond_late,
        }
    }

    #[test]
    fn test_exact_hit_has_zero_error() {
        let target = screen_polar(300.0, 0.0);
        let mut recorder = ErrorRecorder::new();
        let sample = recorder.record(&outcome(target, target, false));
        assert_eq!(sample.degrees(), Some(0.0));
    }

    #[test]
    fn test_clockwise_error_is_positive() {
        // Target straight up, cursor 10° clockwise on screen
        let target = screen_polar(300.0, 0.0);
        let cursor = screen_polar(300.0, 10f32.to_radians());
        let err = signed_error_deg(Vec2::ZERO, target, cursor);
        assert!((err - 10.0).abs() < 1e-3);
        let err = signed_error_deg(Vec2::ZERO, cursor, target);
        assert!((err + 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_error_wraps_across_pi() {
        // Target at 170° screen-atan2, cursor at -170°: 20° apart, not 340°
        let target = crate::polar_to_cartesian(300.0, 170f32.to_radians());
        let cursor = crate::polar_to_cartesian(300.0, (-170f32).to_radians());
        let err = signed_error_deg(Vec2::ZERO, target, cursor);
        assert!((err - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_respond_late_records_invalid() {
        let target = screen_polar(300.0, 0.0);
        let mut recorder = ErrorRecorder::new();
        let sample = recorder.record(&outcome(target, target, true));
        assert_eq!(sample.error, ErrorValue::Invalid);
        assert_eq!(sample.degrees(), None);
    }

    #[test]
    fn test_summary() {
        let target = screen_polar(300.0, 0.0);
        let mut recorder = ErrorRecorder::new();
        recorder.record(&outcome(target, screen_polar(300.0, 10f32.to_radians()), false));
        recorder.record(&outcome(target, screen_polar(300.0, (-20f32).to_radians()), false));
        recorder.record(&outcome(target, target, true));
        let summary = recorder.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.valid, 2);
        assert_eq!(summary.invalid, 1);
        assert!((summary.mean_abs_deg.unwrap() - 15.0).abs() < 1e-2);
        assert_eq!(recorder.export().len(), 3);
    }

    proptest! {
        #[test]
        fn prop_error_in_half_open_range(
            t in -10.0f32..10.0,
            f in -10.0f32..10.0,
            r in 1.0f32..500.0,
        ) {
            let err = signed_error_deg(
                Vec2::new(5.0, -3.0),
                Vec2::new(5.0, -3.0) + screen_polar(300.0, t),
                Vec2::new(5.0, -3.0) + screen_polar(r, f),
            );
            prop_assert!(err > -180.0 && err <= 180.0);
        }
    }
}
