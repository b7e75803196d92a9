//! Per-frame trial controller
//!
//! One call per rendered frame. Order within a tick:
//! 1. apply the scheduled condition for the current attempt count
//! 2. compute the feedback cursor from the raw input
//! 3. classify an active trial as hit or miss
//! 4. spawn a target when the cursor is back at the center
//! 5. flag the trial respond-late once the time limit has passed

use glam::Vec2;
use rand::Rng;

use super::perturbation::feedback_position;
use super::recorder::{ErrorSample, Outcome, TrialOutcome};
use super::schedule::{Block, Condition};
use super::state::{SessionState, Trial, TrialPhase};
use crate::screen_polar;
use crate::settings::TargetMode;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Pointing device position (screen pixels)
    pub raw_position: Vec2,
    /// Monotonic clock (ms)
    pub timestamp_ms: u64,
}

/// What happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum TrialEvent {
    ConditionChanged {
        attempts: u32,
        condition: Condition,
    },
    TargetSpawned {
        attempt_index: u32,
        target_angle: f32,
        position: Vec2,
    },
    RespondLate {
        attempt_index: u32,
    },
    TrialCompleted {
        outcome: Outcome,
        sample: ErrorSample,
    },
    SessionEnded {
        attempts: u32,
    },
}

/// Advance the session by one frame
pub fn tick(state: &mut SessionState, input: &TickInput) -> Vec<TrialEvent> {
    let mut events = Vec::new();

    match state.phase {
        TrialPhase::Finished => return events,
        TrialPhase::Idle => state.phase = TrialPhase::WaitingAtCenter,
        _ => {}
    }

    state.time_ticks += 1;

    // Scheduled condition; takes effect on the tick after the threshold is crossed
    match state.schedule.block_at(state.attempts) {
        Block::End => {
            finish(state, &mut events);
            return events;
        }
        Block::Run(condition) => {
            if condition != state.condition {
                log::info!(
                    "Attempt {}: condition -> perturbation={}, target={:?}",
                    state.attempts,
                    condition.perturbation.as_str(),
                    condition.target_angle.map(|a| a.to_degrees().round())
                );
                state.condition = condition;
                state.perturbation.set_mode(condition.perturbation);
                events.push(TrialEvent::ConditionChanged {
                    attempts: state.attempts,
                    condition,
                });
            }
        }
    }

    let center = state.settings.center();
    let feedback = feedback_position(center, input.raw_position, &state.perturbation);
    state.last_raw = input.raw_position;
    state.last_feedback = feedback;

    // Hit or miss
    if let TrialPhase::TargetActive(trial) = &state.phase {
        let hit = feedback.distance(trial.target_position) <= state.settings.cursor_radius;
        let miss = !hit && feedback.distance(center) > state.settings.miss_distance();

        if hit || miss {
            let outcome = if hit { Outcome::Hit } else { Outcome::Miss };
            let completed = TrialOutcome {
                attempt_index: trial.attempt_index,
                outcome,
                center,
                target: trial.target_position,
                feedback,
                respond_late: state.respond_late,
            };
            complete_trial(state, &completed, &mut events);
        }
    }

    // Back at center with no target: spawn
    if matches!(state.phase, TrialPhase::WaitingAtCenter)
        && feedback.distance(center) <= state.settings.cursor_radius
    {
        spawn_target(state, input.timestamp_ms, &mut events);
    }

    // Time limit: flag only, the trial keeps waiting for a hit or miss
    let limit = state.settings.time_limit_ms;
    if let TrialPhase::TargetActive(trial) = &mut state.phase {
        if let Some(start) = trial.start_time_ms {
            if input.timestamp_ms.saturating_sub(start) > limit {
                trial.start_time_ms = None;
                trial.outcome = Outcome::TimedOut;
                state.respond_late = true;
                log::debug!("Attempt {}: respond late", trial.attempt_index);
                events.push(TrialEvent::RespondLate {
                    attempt_index: trial.attempt_index,
                });
            }
        }
    }

    events
}

/// Angle for the next target: schedule override first, then the target mode
pub fn next_target_angle(state: &mut SessionState) -> f32 {
    match (state.condition.target_angle, state.settings.target_mode) {
        (Some(angle), _) => angle,
        (None, TargetMode::Fixed) => state.settings.start_angle(),
        (None, TargetMode::Random) => state.rng.random_range(0.0..std::f32::consts::TAU),
    }
}

fn spawn_target(state: &mut SessionState, now_ms: u64, events: &mut Vec<TrialEvent>) {
    let target_angle = next_target_angle(state);
    let position = state.settings.center() + screen_polar(state.settings.target_radius, target_angle);
    let trial = Trial {
        attempt_index: state.attempts,
        target_angle,
        target_position: position,
        start_time_ms: Some(now_ms),
        outcome: Outcome::Pending,
    };
    state.respond_late = false;
    state.phase = TrialPhase::TargetActive(trial);
    events.push(TrialEvent::TargetSpawned {
        attempt_index: state.attempts,
        target_angle,
        position,
    });
}

fn complete_trial(state: &mut SessionState, completed: &TrialOutcome, events: &mut Vec<TrialEvent>) {
    state.attempts += 1;
    match completed.outcome {
        Outcome::Hit => state.score += 1,
        _ => state.misses += 1,
    }

    let sample = state.recorder.record(completed);
    state.respond_late = false;
    state.phase = TrialPhase::WaitingAtCenter;
    state.perturbation.record_completed_trial();

    log::debug!(
        "Attempt {}: {:?}, error={:?}",
        completed.attempt_index,
        completed.outcome,
        sample.error
    );
    events.push(TrialEvent::TrialCompleted {
        outcome: completed.outcome,
        sample,
    });
}

fn finish(state: &mut SessionState, events: &mut Vec<TrialEvent>) {
    state.phase = TrialPhase::Finished;
    let summary = state.recorder.summary();
    log::info!(
        "Session ended: attempts={}, score={}, samples={}, invalid={}, mean |error|={:?}",
        state.attempts,
        state.score,
        summary.count,
        summary.invalid,
        summary.mean_abs_deg
    );
    events.push(TrialEvent::SessionEnded {
        attempts: state.attempts,
    });
}
