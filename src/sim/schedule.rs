//! Block schedule: attempt count -> experimental condition
//!
//! A schedule is an ordered table of `(from_attempt, block)` entries. The
//! active block is the last entry whose threshold is <= the attempt count, so
//! the schedule is a step function of attempts and holds no state of its own.

use serde::{Deserialize, Serialize};

use super::perturbation::PerturbationMode;
use crate::settings::ProtocolKind;

/// Target angle override and perturbation for a range of attempts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Target angle (radians, zero at the top); `None` defers to the target mode
    pub target_angle: Option<f32>,
    pub perturbation: PerturbationMode,
}

impl Condition {
    pub const fn new(target_angle: Option<f32>, perturbation: PerturbationMode) -> Self {
        Self {
            target_angle,
            perturbation,
        }
    }

    /// Condition with a target override given in degrees
    pub fn at_degrees(target_deg: f32, perturbation: PerturbationMode) -> Self {
        Self::new(Some(target_deg.to_radians()), perturbation)
    }
}

/// What a schedule entry does once reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Run(Condition),
    /// Terminal entry: the session is over
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub from_attempt: u32,
    pub block: Block,
}

impl ScheduleEntry {
    pub const fn run(from_attempt: u32, condition: Condition) -> Self {
        Self {
            from_attempt,
            block: Block::Run(condition),
        }
    }

    pub const fn end(from_attempt: u32) -> Self {
        Self {
            from_attempt,
            block: Block::End,
        }
    }
}

/// Static protocol table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSchedule {
    entries: Vec<ScheduleEntry>,
}

impl BlockSchedule {
    /// Build a schedule; entries are ordered by threshold (stable for equal thresholds)
    pub fn new(mut entries: Vec<ScheduleEntry>) -> Self {
        entries.sort_by_key(|e| e.from_attempt);
        Self { entries }
    }

    pub fn for_protocol(kind: ProtocolKind) -> Self {
        match kind {
            ProtocolKind::Baseline => Self::baseline(PerturbationMode::Sudden),
            ProtocolKind::GradualBaseline => Self::baseline(PerturbationMode::Gradual),
            ProtocolKind::Extended => Self::extended(),
            ProtocolKind::Free => Self::free(),
        }
    }

    /// Rotation on at 20, off at 80, on at 100, end at 160; target from the target mode
    pub fn baseline(perturbation: PerturbationMode) -> Self {
        let off = Condition::new(None, PerturbationMode::Off);
        let on = Condition::new(None, perturbation);
        Self::new(vec![
            ScheduleEntry::run(0, off),
            ScheduleEntry::run(20, on),
            ScheduleEntry::run(80, off),
            ScheduleEntry::run(100, on),
            ScheduleEntry::end(160),
        ])
    }

    /// Four target angles, 100 attempts each: 20 unperturbed, 60 sudden, 20 washout
    pub fn extended() -> Self {
        const TARGETS_DEG: [f32; 4] = [30.0, 70.0, 50.0, 120.0];
        const BLOCK_LEN: u32 = 100;

        let mut entries = Vec::with_capacity(TARGETS_DEG.len() * 3 + 1);
        for (i, &deg) in TARGETS_DEG.iter().enumerate() {
            let start = i as u32 * BLOCK_LEN;
            entries.push(ScheduleEntry::run(
                start,
                Condition::at_degrees(deg, PerturbationMode::Off),
            ));
            entries.push(ScheduleEntry::run(
                start + 20,
                Condition::at_degrees(deg, PerturbationMode::Sudden),
            ));
            entries.push(ScheduleEntry::run(
                start + 80,
                Condition::at_degrees(deg, PerturbationMode::Off),
            ));
        }
        entries.push(ScheduleEntry::end(TARGETS_DEG.len() as u32 * BLOCK_LEN));
        Self::new(entries)
    }

    /// Unperturbed, open-ended
    pub fn free() -> Self {
        Self::new(vec![ScheduleEntry::run(0, Condition::default())])
    }

    /// Block in force after `attempts` completed trials
    pub fn block_at(&self, attempts: u32) -> Block {
        self.entries
            .iter()
            .rev()
            .find(|e| e.from_attempt <= attempts)
            .map(|e| e.block)
            .unwrap_or(Block::Run(Condition::default()))
    }

    /// Active condition, or `None` once the session has ended
    pub fn condition_at(&self, attempts: u32) -> Option<Condition> {
        match self.block_at(attempts) {
            Block::Run(condition) => Some(condition),
            Block::End => None,
        }
    }

    /// First attempt count at which the session ends, if any
    pub fn end_attempt(&self) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.block == Block::End)
            .map(|e| e.from_attempt)
    }
}
