//! Synthetic participant for headless sessions
//!
//! Returns the hand to the center, waits a reaction time, then reaches
//! radially toward the target direction plus an aim offset. After each
//! recorded error the aim offset adapts: `aim <- retention * aim - rate * error`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::driver::InputSource;
use crate::polar_to_cartesian;
use crate::sim::Frame;

/// Reaching and adaptation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantModel {
    /// Outward hand speed while reaching (px per tick)
    pub reach_speed: f32,
    /// Hand speed while returning to the center (px per tick)
    pub return_speed: f32,
    /// Reach stops at this distance from the center
    pub reach_distance: f32,
    /// Ticks between target onset and movement
    pub reaction_ticks: u32,
    /// Chance that a trial starts after `lapse_ticks` instead
    pub lapse_probability: f32,
    pub lapse_ticks: u32,
    /// Uniform aiming noise half-width (degrees)
    pub motor_noise_deg: f32,
    /// Fraction of the aim offset kept between trials
    pub retention: f32,
    /// Fraction of the last error corrected
    pub learning_rate: f32,
}

impl Default for ParticipantModel {
    fn default() -> Self {
        Self {
            reach_speed: 14.0,
            return_speed: 20.0,
            reach_distance: 320.0,
            reaction_ticks: 15,
            lapse_probability: 0.05,
            lapse_ticks: 75,
            motor_noise_deg: 2.0,
            retention: 0.98,
            learning_rate: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Returning,
    Holding { ticks_left: u32 },
    Reaching { direction: Vec2 },
}

/// Deterministic simulated hand
#[derive(Debug, Clone)]
pub struct SyntheticParticipant {
    pub model: ParticipantModel,
    /// Current aim offset (radians, screen atan2)
    pub aim_offset: f32,
    hand: Vec2,
    motion: Motion,
    seen_attempts: u32,
    rng: Pcg32,
}

impl SyntheticParticipant {
    pub fn new(model: ParticipantModel, seed: u64, start: Vec2) -> Self {
        Self {
            model,
            aim_offset: 0.0,
            hand: start,
            motion: Motion::Returning,
            seen_attempts: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn adapt(&mut self, frame: &Frame) {
        if frame.attempts <= self.seen_attempts {
            return;
        }
        self.seen_attempts = frame.attempts;
        self.aim_offset *= self.model.retention;
        if let Some(error_deg) = frame.last_error.and_then(|s| s.degrees()) {
            self.aim_offset -= self.model.learning_rate * error_deg.to_radians();
        }
    }

    fn reaction_time(&mut self) -> u32 {
        if self.rng.random::<f32>() < self.model.lapse_probability {
            self.model.lapse_ticks
        } else {
            self.model.reaction_ticks
        }
    }

    fn aim_at(&mut self, center: Vec2, target: Vec2) -> Vec2 {
        let to_target = target - center;
        let noise = if self.model.motor_noise_deg > 0.0 {
            let half = self.model.motor_noise_deg.to_radians();
            self.rng.random_range(-half..=half)
        } else {
            0.0
        };
        let angle = to_target.y.atan2(to_target.x) + self.aim_offset + noise;
        polar_to_cartesian(1.0, angle)
    }

    fn step_toward(&mut self, goal: Vec2, speed: f32) {
        let delta = goal - self.hand;
        if delta.length() <= speed {
            self.hand = goal;
        } else {
            self.hand += delta.normalize() * speed;
        }
    }
}

impl InputSource for SyntheticParticipant {
    fn position(&mut self) -> Vec2 {
        self.hand
    }

    fn observe(&mut self, frame: &Frame) {
        self.adapt(frame);

        let Some(target) = frame.target else {
            self.motion = Motion::Returning;
            self.step_toward(frame.center, self.model.return_speed);
            return;
        };

        match self.motion {
            Motion::Returning => {
                let ticks_left = self.reaction_time();
                self.motion = Motion::Holding { ticks_left };
            }
            Motion::Holding { ticks_left } if ticks_left > 0 => {
                self.motion = Motion::Holding {
                    ticks_left: ticks_left - 1,
                };
            }
            Motion::Holding { .. } => {
                let direction = self.aim_at(frame.center, target);
                self.motion = Motion::Reaching { direction };
            }
            Motion::Reaching { direction } => {
                let goal = frame.center + direction * self.model.reach_distance;
                self.step_toward(goal, self.model.reach_speed);
            }
        }
    }
}
