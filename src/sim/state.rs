//! Session state and trial types
//!
//! All mutable experiment state lives in `SessionState` and is only changed by `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::perturbation::PerturbationState;
use super::recorder::{ErrorRecorder, ErrorSample, Outcome};
use super::schedule::{Block, BlockSchedule, Condition};
use crate::settings::Settings;

/// A single reach toward one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Attempts completed before this trial started
    pub attempt_index: u32,
    /// Radians, zero at the top, fixed for the trial
    pub target_angle: f32,
    pub target_position: Vec2,
    /// Timer reference; cleared once the time limit has fired
    pub start_time_ms: Option<u64>,
    pub outcome: Outcome,
}

/// Where the controller is in the trial cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrialPhase {
    /// No tick has run yet
    Idle,
    /// No target; waiting for the cursor to reach the center
    WaitingAtCenter,
    /// Target shown, timer running
    TargetActive(Trial),
    /// Schedule reached its terminal entry
    Finished,
}

/// Debug overlay fields for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DebugInfo {
    pub raw: Vec2,
    pub delta: Vec2,
    /// Rounded degrees, screen atan2
    pub raw_angle_deg: f32,
    pub cursor_angle_deg: f32,
}

/// Everything the rendering collaborator needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub center: Vec2,
    pub cursor: Vec2,
    pub cursor_visible: bool,
    pub cursor_radius: f32,
    pub target: Option<Vec2>,
    pub score: u32,
    pub attempts: u32,
    /// Show the "move faster" prompt
    pub respond_late: bool,
    pub last_error: Option<ErrorSample>,
    pub condition: Condition,
    pub debug: DebugInfo,
}

/// Complete experiment state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub settings: Settings,
    pub schedule: BlockSchedule,
    pub phase: TrialPhase,
    /// Condition currently applied
    pub condition: Condition,
    pub perturbation: PerturbationState,
    /// Completed trials (hits + misses)
    pub attempts: u32,
    /// Hits
    pub score: u32,
    pub misses: u32,
    /// Time limit passed on the current trial; taints its error sample
    pub respond_late: bool,
    pub recorder: ErrorRecorder,
    /// Last raw input and cursor positions
    pub last_raw: Vec2,
    pub last_feedback: Vec2,
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl SessionState {
    /// New session with the schedule picked by `settings.protocol`
    pub fn new(settings: Settings) -> Self {
        let schedule = BlockSchedule::for_protocol(settings.protocol);
        Self::with_schedule(settings, schedule)
    }

    pub fn with_schedule(settings: Settings, schedule: BlockSchedule) -> Self {
        let center = settings.center();
        let mut perturbation = PerturbationState::new(settings.perturbation_angle());
        let condition = match schedule.block_at(0) {
            Block::Run(condition) => condition,
            Block::End => Condition::default(),
        };
        perturbation.set_mode(condition.perturbation);

        log::info!(
            "Session created: protocol={}, target_mode={}, seed={}",
            settings.protocol.as_str(),
            settings.target_mode.as_str(),
            settings.seed
        );

        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            schedule,
            phase: TrialPhase::Idle,
            condition,
            perturbation,
            attempts: 0,
            score: 0,
            misses: 0,
            respond_late: false,
            recorder: ErrorRecorder::new(),
            last_raw: center,
            last_feedback: center,
            time_ticks: 0,
        }
    }

    /// Trial in progress, if a target is shown
    pub fn current_trial(&self) -> Option<&Trial> {
        match &self.phase {
            TrialPhase::TargetActive(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn current_target(&self) -> Option<Vec2> {
        self.current_trial().map(|t| t.target_position)
    }

    pub fn last_error(&self) -> Option<&ErrorSample> {
        self.recorder.last()
    }

    pub fn error_samples(&self) -> &[ErrorSample] {
        self.recorder.samples()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, TrialPhase::Finished)
    }

    /// Snapshot for the renderer
    pub fn frame(&self) -> Frame {
        let center = self.settings.center();
        let delta = self.last_raw - center;
        let cursor_delta = self.last_feedback - center;
        let cursor_visible =
            !self.settings.mask_mode || delta.length() < self.settings.mask_radius();

        Frame {
            center,
            cursor: self.last_feedback,
            cursor_visible,
            cursor_radius: self.settings.cursor_radius,
            target: self.current_target(),
            score: self.score,
            attempts: self.attempts,
            respond_late: self.respond_late,
            last_error: self.last_error().copied(),
            condition: self.condition,
            debug: DebugInfo {
                raw: self.last_raw,
                delta,
                raw_angle_deg: delta.y.atan2(delta.x).to_degrees().round(),
                cursor_angle_deg: cursor_delta.y.atan2(cursor_delta.x).to_degrees().round(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProtocolKind;
    use crate::sim::perturbation::PerturbationMode;

    #[test]
    fn test_new_session_starts_idle() {
        let state = SessionState::new(Settings::from_protocol(ProtocolKind::Baseline));
        assert_eq!(state.phase, TrialPhase::Idle);
        assert_eq!(state.attempts, 0);
        assert_eq!(state.perturbation.mode, PerturbationMode::Off);
        assert!(state.current_target().is_none());
        assert!(state.recorder.is_empty());
    }

    #[test]
    fn test_mask_hides_far_cursor() {
        let mut settings = Settings::default();
        settings.mask_mode = true;
        let mut state = SessionState::new(settings);
        let center = state.settings.center();

        state.last_raw = center + Vec2::new(50.0, 0.0);
        state.last_feedback = state.last_raw;
        assert!(state.frame().cursor_visible);

        state.last_raw = center + Vec2::new(250.0, 0.0);
        state.last_feedback = state.last_raw;
        assert!(!state.frame().cursor_visible);
    }

    #[test]
    fn test_frame_debug_angles() {
        let mut state = SessionState::new(Settings::default());
        let center = state.settings.center();
        state.last_raw = center + Vec2::new(0.0, 100.0);
        state.last_feedback = center + Vec2::new(100.0, 0.0);
        let frame = state.frame();
        assert_eq!(frame.debug.raw_angle_deg, 90.0);
        assert_eq!(frame.debug.cursor_angle_deg, 0.0);
        assert_eq!(frame.debug.delta, Vec2::new(0.0, 100.0));
    }
}
