//! Pomodoro phase state machine.
//!
//! The machine has no clock and no threads. Every command returns the ordered
//! list of [`Update`]s it produced; the caller publishes them and feeds clock
//! values back through [`PomodoroMachine::tick`].
//!
//! ## Phase cycle
//!
//! ```text
//! Focus -> ShortBreak -> Focus -> ... -> Focus -> LongBreak -> Focus
//!          (pomodoro_max - 1 short breaks between long breaks)
//! ```
//!
//! ## Usage
//!
//! ```
//! # use komodoro_core::timer::{PomodoroMachine, TimerConfig, PhaseKind};
//! let mut machine = PomodoroMachine::new(TimerConfig::default());
//! machine.start();
//! machine.next();
//! assert_eq!(machine.state().phase, PhaseKind::ShortBreak);
//! ```

use std::time::Duration;

use chrono::Utc;

use super::schedule::{PhaseKind, TimerConfig};
use super::state::{PhaseStatus, TimerState};
use crate::events::Event;

/// A single publication produced by a transition, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Cycles(u32),
    State(TimerState),
    Event(Event),
}

#[derive(Debug, Clone)]
pub struct PomodoroMachine {
    config: TimerConfig,
    state: TimerState,
    /// Completed focus phases since the last long break.
    cycles: u32,
}

impl PomodoroMachine {
    /// Starts idle at the beginning of a focus phase.
    pub fn new(config: TimerConfig) -> Self {
        let state = TimerState::idle(PhaseKind::Focus, config.focus_duration());
        Self {
            config,
            state,
            cycles: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run the current phase from its current remaining duration.
    pub fn start(&mut self) -> Vec<Update> {
        self.state = TimerState::running(self.state.phase, self.state.remaining);
        vec![
            Update::State(self.state),
            Update::Event(Event::TimerStarted {
                phase: self.state.phase,
                remaining_ms: millis(self.state.remaining),
                at: Utc::now(),
            }),
        ]
    }

    /// Freeze at the current remaining duration. Republishes when already idle.
    pub fn pause(&mut self) -> Vec<Update> {
        let was_running = self.is_running();
        self.state = TimerState::idle(self.state.phase, self.state.remaining);
        let mut out = vec![Update::State(self.state)];
        if was_running {
            out.push(Update::Event(Event::TimerPaused {
                phase: self.state.phase,
                remaining_ms: millis(self.state.remaining),
                at: Utc::now(),
            }));
        }
        out
    }

    /// Skip to the following phase and run it, whatever the current status.
    pub fn next(&mut self) -> Vec<Update> {
        let from = self.state.phase;
        let mut out = Vec::new();
        self.advance(&mut out);
        out.push(Update::Event(Event::PhaseSkipped {
            from,
            to: self.state.phase,
            at: Utc::now(),
        }));
        self.push_phase_started(&mut out);
        out
    }

    /// Back to an idle focus phase with the cycle count cleared.
    pub fn stop(&mut self) -> Vec<Update> {
        let mut out = Vec::new();
        self.set_cycles(0, &mut out);
        self.state = TimerState::idle(PhaseKind::Focus, self.config.focus_duration());
        out.push(Update::State(self.state));
        out.push(Update::Event(Event::TimerReset { at: Utc::now() }));
        out
    }

    /// Apply one countdown value. Reaching zero publishes `Finished` and
    /// advances to the next running phase in the same step.
    ///
    /// Values are ignored unless the machine is running.
    pub fn tick(&mut self, remaining: Duration) -> Vec<Update> {
        if !self.is_running() {
            tracing::debug!(?remaining, state = ?self.state, "ignoring tick while not running");
            return Vec::new();
        }
        if !remaining.is_zero() {
            self.state.remaining = remaining;
            return vec![Update::State(self.state)];
        }

        let finished = self.state.phase;
        self.state = TimerState::finished(finished);
        let mut out = vec![
            Update::State(self.state),
            Update::Event(Event::PhaseCompleted {
                phase: finished,
                cycles: self.cycles,
                at: Utc::now(),
            }),
        ];
        self.advance(&mut out);
        self.push_phase_started(&mut out);
        out
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self, out: &mut Vec<Update>) {
        let (next, cycles) = match self.state.phase {
            PhaseKind::Focus if self.cycles + 1 >= self.config.pomodoro_max() => {
                (PhaseKind::LongBreak, self.cycles)
            }
            PhaseKind::Focus => (PhaseKind::ShortBreak, self.cycles + 1),
            PhaseKind::ShortBreak => (PhaseKind::Focus, self.cycles),
            PhaseKind::LongBreak => (PhaseKind::Focus, 0),
        };
        self.set_cycles(cycles, out);
        self.state = TimerState::running(next, next.duration(&self.config));
        tracing::debug!(phase = ?next, cycles, "entered phase");
        out.push(Update::State(self.state));
    }

    fn set_cycles(&mut self, cycles: u32, out: &mut Vec<Update>) {
        if self.cycles != cycles {
            self.cycles = cycles;
            out.push(Update::Cycles(cycles));
        }
    }

    fn push_phase_started(&self, out: &mut Vec<Update>) {
        debug_assert_eq!(self.state.status, PhaseStatus::Running);
        out.push(Update::Event(Event::PhaseStarted {
            phase: self.state.phase,
            duration_ms: millis(self.state.remaining),
            cycles: self.cycles,
            at: Utc::now(),
        }));
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
