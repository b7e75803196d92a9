//! Fixed-rate outer loop
//!
//! Owns the collaborators (input device, clock, renderer, cancellation) and
//! calls `sim::tick` once per frame. The loop exits when the schedule ends the
//! session, when a stop is requested, or when the tick budget runs out; the
//! current tick always completes first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::sim::{ErrorRecorder, Frame, SessionState, TickInput, TrialEvent, tick};

/// Pointing device
pub trait InputSource {
    /// Position for the coming tick (screen pixels)
    fn position(&mut self) -> Vec2;

    /// Frame shown after the tick
    fn observe(&mut self, _frame: &Frame) {}
}

/// Monotonic time source and frame pacing
pub trait Clock {
    fn now_ms(&self) -> u64;
    /// Block until the next tick boundary
    fn wait_next_tick(&mut self);
}

/// Rendering collaborator
pub trait FrameSink {
    fn draw(&mut self, frame: &Frame);
}

/// Cooperative cancellation, checked once per tick
pub trait StopSignal {
    fn stop_requested(&self) -> bool;
}

/// Wall-clock pacing with `thread::sleep`
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
    period: Duration,
    next: Instant,
}

impl SystemClock {
    pub fn new(tick_hz: u32) -> Self {
        let origin = Instant::now();
        let period = Duration::from_secs_f64(1.0 / tick_hz.max(1) as f64);
        Self {
            origin,
            period,
            next: origin + period,
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wait_next_tick(&mut self) {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            // Behind schedule: don't try to catch up
            self.next = now + self.period;
        }
    }
}

/// Clock that advances one tick period per tick without sleeping
///
/// Time is derived from the tick count so fractional periods do not drift.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    ticks: u64,
    tick_hz: u64,
}

impl SimulatedClock {
    pub fn new(tick_hz: u32) -> Self {
        Self {
            ticks: 0,
            tick_hz: tick_hz.max(1) as u64,
        }
    }
}

impl Clock for SimulatedClock {
    fn now_ms(&self) -> u64 {
        self.ticks * 1000 / self.tick_hz
    }

    fn wait_next_tick(&mut self) {
        self.ticks += 1;
    }
}

/// Discards frames
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn draw(&mut self, _frame: &Frame) {}
}

/// Logs a one-line frame summary every `every` frames
#[derive(Debug)]
pub struct LogSink {
    every: u64,
    frames: u64,
}

impl LogSink {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }
}

impl FrameSink for LogSink {
    fn draw(&mut self, frame: &Frame) {
        self.frames += 1;
        if self.frames.is_multiple_of(self.every) {
            log::debug!(
                "frame {}: score={} attempts={} target={:?} cursor=({:.0}, {:.0}){}",
                self.frames,
                frame.score,
                frame.attempts,
                frame.target.map(|t| (t.x.round(), t.y.round())),
                frame.cursor.x,
                frame.cursor.y,
                if frame.respond_late { " MOVE FASTER" } else { "" }
            );
        }
    }
}

/// Stop flag shareable with another thread or a signal handler
#[derive(Debug, Clone, Default)]
pub struct AtomicStop(Arc<AtomicBool>);

impl AtomicStop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl StopSignal for AtomicStop {
    fn stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why the loop exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Schedule reached its terminal attempt
    Completed,
    Cancelled,
    TickBudget,
}

/// Result of a finished loop, ready for export
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub reason: ExitReason,
    pub ticks: u64,
    pub attempts: u32,
    pub score: u32,
    pub recorder: ErrorRecorder,
}

/// Run the experiment loop until the session ends, is cancelled, or `max_ticks` pass
pub fn run_session<I, C, F, S>(
    state: &mut SessionState,
    input: &mut I,
    clock: &mut C,
    sink: &mut F,
    stop: &S,
    max_ticks: Option<u64>,
) -> SessionReport
where
    I: InputSource,
    C: Clock,
    F: FrameSink,
    S: StopSignal,
{
    let mut ticks = 0u64;

    let reason = loop {
        if state.is_finished() {
            break ExitReason::Completed;
        }
        if stop.stop_requested() {
            break ExitReason::Cancelled;
        }
        if max_ticks.is_some_and(|max| ticks >= max) {
            break ExitReason::TickBudget;
        }

        let tick_input = TickInput {
            raw_position: input.position(),
            timestamp_ms: clock.now_ms(),
        };
        let events = tick(state, &tick_input);
        ticks += 1;

        let frame = state.frame();
        sink.draw(&frame);
        input.observe(&frame);

        if events
            .iter()
            .any(|e| matches!(e, TrialEvent::SessionEnded { .. }))
        {
            break ExitReason::Completed;
        }
        clock.wait_next_tick();
    };

    log::info!(
        "Loop exited after {} ticks ({:?}): attempts={}, score={}",
        ticks,
        reason,
        state.attempts,
        state.score
    );

    SessionReport {
        reason,
        ticks,
        attempts: state.attempts,
        score: state.score,
        recorder: state.recorder.clone(),
    }
}
