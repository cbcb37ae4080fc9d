//! Async timer engine.
//!
//! A single actor task owns the [`PomodoroMachine`] and the one active
//! [`PhaseClock`]. Control calls are queued to it over a channel, and clock
//! ticks are drained by the same task, so a command and a tick are never
//! applied concurrently and a cancelled clock can never leak a value into
//! the next phase.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = PomodoroEngine::new(TimerConfig::default())?;
//! let mut states = engine.subscribe_state();
//! engine.start();
//! while let Some(state) = states.recv().await {
//!     redraw(state);
//! }
//! ```

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::clock::PhaseClock;
use super::machine::{PomodoroMachine, Update};
use super::schedule::TimerConfig;
use super::state::TimerState;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::observe::{Observable, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Next,
    Stop,
}

/// Handle to a running timer session.
///
/// Dropping the handle stops the session.
#[derive(Debug)]
pub struct PomodoroEngine {
    commands: mpsc::UnboundedSender<Command>,
    state: Observable<TimerState>,
    cycles: Observable<u32>,
    events: broadcast::Sender<Event>,
    config: TimerConfig,
    handle: JoinHandle<()>,
}

impl PomodoroEngine {
    /// Spawn the engine on the current tokio runtime, idle at the start of a
    /// focus phase.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(config: TimerConfig) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CoreError::NoRuntime)?;

        let machine = PomodoroMachine::new(config.clone());
        let capacity = config.event_capacity();
        let state = Observable::new(machine.state(), capacity);
        let cycles = Observable::new(machine.cycles(), capacity);
        let (events, _) = broadcast::channel(capacity);
        let (commands, inbox) = mpsc::unbounded_channel();

        let actor = Actor {
            machine,
            clock: None,
            inbox,
            state: state.clone(),
            cycles: cycles.clone(),
            events: events.clone(),
        };
        let handle = runtime.spawn(actor.run());

        Ok(Self {
            commands,
            state,
            cycles,
            events,
            config,
            handle,
        })
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Current snapshot first, then every change.
    pub fn subscribe_state(&self) -> Subscription<TimerState> {
        self.state.subscribe()
    }

    /// Current completed-cycle count first, then every change.
    pub fn subscribe_cycles(&self) -> Subscription<u32> {
        self.cycles.subscribe()
    }

    /// Transition events from now on. Past events are not replayed.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Latest published snapshot.
    pub fn state(&self) -> TimerState {
        self.state.get()
    }

    /// Latest published cycle count.
    pub fn cycles(&self) -> u32 {
        self.cycles.get()
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&self) {
        self.send(Command::Start);
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub fn next(&self) {
        self.send(Command::Next);
    }

    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Stop the session and wait for the actor to exit.
    pub async fn shutdown(self) {
        let Self {
            commands, handle, ..
        } = self;
        drop(commands);
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "timer actor ended abnormally");
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!(?command, "timer actor is gone, command dropped");
        }
    }
}

struct Actor {
    machine: PomodoroMachine,
    /// At most one clock, always for the current running phase.
    clock: Option<PhaseClock>,
    inbox: mpsc::UnboundedReceiver<Command>,
    state: Observable<TimerState>,
    cycles: Observable<u32>,
    events: broadcast::Sender<Event>,
}

impl Actor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                remaining = next_tick(&mut self.clock) => self.handle_tick(remaining),
            }
        }
        self.cancel_clock();
        tracing::debug!("timer actor stopped");
    }

    fn handle_command(&mut self, command: Command) {
        self.cancel_clock();
        let updates = match command {
            Command::Start => self.machine.start(),
            Command::Pause => self.machine.pause(),
            Command::Next => self.machine.next(),
            Command::Stop => self.machine.stop(),
        };
        tracing::debug!(?command, state = ?self.machine.state(), "command applied");
        self.publish(updates);
        self.arm_clock();
    }

    fn handle_tick(&mut self, remaining: Duration) {
        let updates = self.machine.tick(remaining);
        self.publish(updates);
        if remaining.is_zero() {
            // The finished clock is replaced by one for the phase just entered.
            self.cancel_clock();
            self.arm_clock();
        }
    }

    fn arm_clock(&mut self) {
        debug_assert!(self.clock.is_none());
        if !self.machine.is_running() {
            return;
        }
        let remaining = self.machine.state().remaining;
        match PhaseClock::start(remaining, self.machine.config().tick_interval()) {
            Ok(clock) => self.clock = Some(clock),
            Err(e) => tracing::error!(error = %e, ?remaining, "could not start phase clock"),
        }
    }

    fn cancel_clock(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.cancel();
        }
    }

    fn publish(&self, updates: Vec<Update>) {
        for update in updates {
            match update {
                Update::Cycles(cycles) => self.cycles.publish(cycles),
                Update::State(state) => self.state.publish(state),
                Update::Event(event) => {
                    let _ = self.events.send(event);
                }
            }
        }
    }
}

/// Next value of the active clock; pends forever when there is none.
async fn next_tick(clock: &mut Option<PhaseClock>) -> Duration {
    if let Some(clock) = clock.as_mut() {
        if let Some(remaining) = clock.next_tick().await {
            return remaining;
        }
    }
    std::future::pending().await
}
