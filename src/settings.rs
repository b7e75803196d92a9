//! Experiment settings
//!
//! Loaded from an optional JSON file, then overridden from the command line.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{Error, Result};

/// How a target angle is chosen when the block schedule does not override it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetMode {
    /// Always the configured start angle
    #[default]
    Fixed,
    /// Fresh uniform draw over [0, 2π) for every target
    Random,
}

impl TargetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Fixed => "fixed",
            TargetMode::Random => "random",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" | "fix" => Some(TargetMode::Fixed),
            "random" | "rand" => Some(TargetMode::Random),
            _ => None,
        }
    }
}

/// Which block schedule drives the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProtocolKind {
    /// Sudden rotation toggled on and off, single target
    Baseline,
    /// Four target angles, each with calibration and sudden-rotation blocks
    #[default]
    Extended,
    /// Baseline timings with a gradual ramp instead of a sudden rotation
    GradualBaseline,
    /// No perturbation, no terminal attempt
    Free,
}

impl ProtocolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolKind::Baseline => "baseline",
            ProtocolKind::Extended => "extended",
            ProtocolKind::GradualBaseline => "gradual",
            ProtocolKind::Free => "free",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "baseline" => Some(ProtocolKind::Baseline),
            "extended" => Some(ProtocolKind::Extended),
            "gradual" | "gradual-baseline" => Some(ProtocolKind::GradualBaseline),
            "free" => Some(ProtocolKind::Free),
            _ => None,
        }
    }
}

/// Experiment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Geometry ===
    /// Center of the display surface (start position)
    pub center: [f32; 2],
    /// Distance from center to targets
    pub target_radius: f32,
    /// Cursor size, hit distance and "at center" distance
    pub cursor_radius: f32,
    /// Multiplier on the target radius beyond which a reach is a miss
    pub miss_tolerance: f32,

    // === Targets ===
    pub target_mode: TargetMode,
    /// Angle used by `TargetMode::Fixed` (degrees, zero at the top)
    pub start_angle_deg: f32,

    // === Perturbation ===
    /// Rotation magnitude (degrees)
    pub perturbation_deg: f32,
    pub protocol: ProtocolKind,

    // === Timing ===
    /// Response limit before the trial is flagged respond-late
    pub time_limit_ms: u64,
    /// Frame rate of the outer loop
    pub tick_hz: u32,

    // === Presentation ===
    /// Hide the cursor beyond `mask_fraction * target_radius`
    pub mask_mode: bool,
    pub mask_fraction: f32,

    /// Seed for random target angles
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            center: [CENTER_X, CENTER_Y],
            target_radius: TARGET_RADIUS,
            cursor_radius: CURSOR_RADIUS,
            miss_tolerance: MISS_TOLERANCE,

            target_mode: TargetMode::Fixed,
            start_angle_deg: 0.0,

            perturbation_deg: PERTURBATION_DEG,
            protocol: ProtocolKind::Extended,

            time_limit_ms: TIME_LIMIT_MS,
            tick_hz: TICK_HZ,

            mask_mode: false,
            mask_fraction: MASK_FRACTION,

            seed: 0,
        }
    }
}

impl Settings {
    /// Create settings for a protocol (other values at their defaults)
    pub fn from_protocol(protocol: ProtocolKind) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::from(self.center)
    }

    /// Rotation magnitude in radians
    pub fn perturbation_angle(&self) -> f32 {
        self.perturbation_deg.to_radians()
    }

    pub fn start_angle(&self) -> f32 {
        self.start_angle_deg.to_radians()
    }

    /// Distance from center beyond which an active trial is a miss
    pub fn miss_distance(&self) -> f32 {
        self.target_radius * self.miss_tolerance
    }

    /// Raw distance below which the cursor is drawn in mask mode
    pub fn mask_radius(&self) -> f32 {
        self.mask_fraction * self.target_radius
    }

    /// Reject settings the controller cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.target_radius > 0.0) {
            return Err(Error::InvalidSettings(format!(
                "target_radius must be positive, got {}",
                self.target_radius
            )));
        }
        if !(self.cursor_radius > 0.0) || self.cursor_radius >= self.target_radius {
            return Err(Error::InvalidSettings(format!(
                "cursor_radius must be in (0, target_radius), got {}",
                self.cursor_radius
            )));
        }
        if !(self.miss_tolerance >= 1.0) {
            return Err(Error::InvalidSettings(format!(
                "miss_tolerance must be at least 1.0, got {}",
                self.miss_tolerance
            )));
        }
        if self.time_limit_ms == 0 {
            return Err(Error::InvalidSettings("time_limit_ms must be non-zero".into()));
        }
        if self.tick_hz == 0 || self.tick_hz > MAX_TICK_HZ {
            return Err(Error::InvalidSettings(format!(
                "tick_hz must be in 1..={MAX_TICK_HZ}, got {}",
                self.tick_hz
            )));
        }
        if !self.perturbation_deg.is_finite() || !self.start_angle_deg.is_finite() {
            return Err(Error::InvalidSettings("angles must be finite".into()));
        }
        Ok(())
    }

    /// Load settings from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
