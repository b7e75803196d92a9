//! Reach Adapt - a visuomotor rotation reaching experiment
//!
//! Core modules:
//! - `sim`: Deterministic trial controller (perturbation, block schedule, error recording)
//! - `settings`: Experiment configuration
//! - `driver`: Fixed-rate outer loop and collaborator traits
//! - `participant`: Synthetic participant for headless sessions
//! - `export`: Flat error table output

pub mod driver;
pub mod error;
pub mod export;
pub mod participant;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::{ProtocolKind, Settings, TargetMode};

use glam::Vec2;

/// Experiment configuration constants
pub mod consts {
    /// Nominal frame rate of the experiment loop
    pub const TICK_HZ: u32 = 60;
    /// Highest rate with at least one millisecond per tick
    pub const MAX_TICK_HZ: u32 = 1000;

    /// Distance from center to every target (pixels)
    pub const TARGET_RADIUS: f32 = 300.0;
    /// Cursor size; also the hit distance and the "at center" distance
    pub const CURSOR_RADIUS: f32 = 25.0;
    /// Outward tolerance applied to the target radius before a reach counts as a miss
    pub const MISS_TOLERANCE: f32 = 1.01;
    /// Cursor is hidden beyond this fraction of the target radius in mask mode
    pub const MASK_FRACTION: f32 = 0.66;

    /// Response time limit per trial (ms)
    pub const TIME_LIMIT_MS: u64 = 1000;

    /// Rotation magnitude (degrees)
    pub const PERTURBATION_DEG: f32 = 30.0;
    /// Number of equal increments in a gradual ramp
    pub const GRADUAL_STEPS: u32 = 10;
    /// Completed trials per gradual increment
    pub const TRIALS_PER_STEP: u32 = 3;

    /// Reference display (2800x1800 scaled down by 1.5), center of the surface
    pub const CENTER_X: f32 = 933.0;
    pub const CENTER_Y: f32 = 600.0;
}

/// Wrap an angle in degrees into (-180, 180]
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Offset for a target placed at `angle` on screen (zero at the top, clockwise, y down)
#[inline]
pub fn screen_polar(r: f32, angle: f32) -> Vec2 {
    Vec2::new(r * angle.sin(), -r * angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-15.0), -15.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
    }

    #[test]
    fn test_polar_roundtrip_angle() {
        let p = polar_to_cartesian(10.0, 0.75);
        let (r, theta) = cartesian_to_polar(p);
        assert!((r - 10.0).abs() < 1e-4);
        assert!((theta - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_screen_polar_zero_is_up() {
        let up = screen_polar(300.0, 0.0);
        assert!(up.x.abs() < 1e-4);
        assert!((up.y + 300.0).abs() < 1e-4);
        let right = screen_polar(300.0, PI / 2.0);
        assert!((right.x - 300.0).abs() < 1e-3);
    }
}
