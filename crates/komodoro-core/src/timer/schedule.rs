use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One of the three timed segments of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl PhaseKind {
    /// Initial duration of this phase under `config`.
    pub fn duration(self, config: &TimerConfig) -> Duration {
        match self {
            PhaseKind::Focus => config.focus_duration,
            PhaseKind::ShortBreak => config.short_break_duration,
            PhaseKind::LongBreak => config.long_break_duration,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Focus => "Focus",
            PhaseKind::ShortBreak => "Short Break",
            PhaseKind::LongBreak => "Long Break",
        }
    }
}

/// Immutable timer configuration, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    focus_duration: Duration,
    short_break_duration: Duration,
    long_break_duration: Duration,
    /// Focus phases per cycle before a long break.
    pomodoro_max: u32,
    tick_interval: Duration,
    /// Buffer size of the broadcast channels observers read from.
    event_capacity: usize,
}

pub const DEFAULT_FOCUS: Duration = Duration::from_secs(25 * 60);
pub const DEFAULT_SHORT_BREAK: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_LONG_BREAK: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_POMODORO_MAX: u32 = 4;
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

impl TimerConfig {
    /// Build a configuration with the default one-second tick.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if any duration is zero or
    /// `pomodoro_max` is zero.
    pub fn new(
        focus_duration: Duration,
        short_break_duration: Duration,
        long_break_duration: Duration,
        pomodoro_max: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            focus_duration,
            short_break_duration,
            long_break_duration,
            pomodoro_max,
            tick_interval: DEFAULT_TICK,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the tick interval.
    pub fn with_tick_interval(mut self, tick: Duration) -> Result<Self, ConfigError> {
        self.tick_interval = tick;
        self.validate()?;
        Ok(self)
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        self.event_capacity = capacity;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("focus_duration", self.focus_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
            ("tick_interval", self.tick_interval),
        ];
        for (key, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::invalid(key, "must be positive"));
            }
        }
        if self.pomodoro_max == 0 {
            return Err(ConfigError::invalid("pomodoro_max", "must be at least 1"));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::invalid("event_capacity", "must be at least 1"));
        }
        Ok(())
    }

    pub fn focus_duration(&self) -> Duration {
        self.focus_duration
    }

    pub fn short_break_duration(&self) -> Duration {
        self.short_break_duration
    }

    pub fn long_break_duration(&self) -> Duration {
        self.long_break_duration
    }

    pub fn pomodoro_max(&self) -> u32 {
        self.pomodoro_max
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: DEFAULT_FOCUS,
            short_break_duration: DEFAULT_SHORT_BREAK,
            long_break_duration: DEFAULT_LONG_BREAK,
            pomodoro_max: DEFAULT_POMODORO_MAX,
            tick_interval: DEFAULT_TICK,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
