//! Deterministic experiment core
//!
//! All trial logic lives here. This module must stay pure:
//! - Time comes in through `TickInput`, never from a clock
//! - Seeded RNG only
//! - No rendering, input polling or file I/O

pub mod perturbation;
pub mod recorder;
pub mod schedule;
pub mod state;
pub mod tick;

pub use perturbation::{PerturbationMode, PerturbationState, feedback_position, perturb_angle};
pub use recorder::{ErrorRecorder, ErrorSample, ErrorSummary, ErrorValue, Outcome, TrialOutcome};
pub use schedule::{Block, BlockSchedule, Condition, ScheduleEntry};
pub use state::{DebugInfo, Frame, SessionState, Trial, TrialPhase};
pub use tick::{TickInput, TrialEvent, next_target_angle, tick};
