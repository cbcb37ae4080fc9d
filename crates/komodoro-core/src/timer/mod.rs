mod clock;
mod engine;
mod machine;
mod schedule;
mod state;

pub use clock::PhaseClock;
pub use engine::PomodoroEngine;
pub use machine::{PomodoroMachine, Update};
pub use schedule::{
    PhaseKind, TimerConfig, DEFAULT_EVENT_CAPACITY, DEFAULT_FOCUS, DEFAULT_LONG_BREAK,
    DEFAULT_POMODORO_MAX, DEFAULT_SHORT_BREAK, DEFAULT_TICK,
};
pub use state::{PhaseStatus, TimerState};
