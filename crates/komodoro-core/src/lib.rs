//! # Komodoro Core Library
//!
//! The core of the Komodoro Pomodoro timer: a focus / short break / long break
//! phase cycle driven by a one-second countdown. Presentation layers (the CLI,
//! a desktop window, a tray icon) observe published snapshots and call the four
//! control operations; they never touch the timer state directly.
//!
//! ## Architecture
//!
//! - **Phase machine**: a pure state machine implementing the phase-advance
//!   rule, usable without any runtime
//! - **Phase clock**: a cancellable countdown running on a tokio task
//! - **Engine**: an actor serializing commands and clock ticks, publishing
//!   replay-latest state streams
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PomodoroEngine`]: async timer session with subscriptions
//! - [`PomodoroMachine`]: the synchronous phase state machine
//! - [`PhaseClock`]: single-use countdown producer
//! - [`Config`]: configuration file management

pub mod error;
pub mod events;
pub mod observe;
pub mod storage;
pub mod timer;

pub use error::{ClockError, ConfigError, CoreError};
pub use events::Event;
pub use observe::{Observable, Subscription};
pub use storage::Config;
pub use timer::{
    PhaseClock, PhaseKind, PhaseStatus, PomodoroEngine, PomodoroMachine, TimerConfig, TimerState,
};
