use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::PhaseKind;

/// Notable transitions, published alongside the state snapshots.
/// Unlike snapshots these are not replayed to late subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: PhaseKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: PhaseKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// The countdown of `phase` reached zero on its own.
    PhaseCompleted {
        phase: PhaseKind,
        cycles: u32,
        at: DateTime<Utc>,
    },
    PhaseSkipped {
        from: PhaseKind,
        to: PhaseKind,
        at: DateTime<Utc>,
    },
    /// A new phase was entered, by completion or by skip.
    PhaseStarted {
        phase: PhaseKind,
        duration_ms: u64,
        cycles: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::PhaseCompleted { at, .. }
            | Event::PhaseSkipped { at, .. }
            | Event::PhaseStarted { at, .. }
            | Event::TimerReset { at } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_serialization() {
        let at = Utc::now();
        let event = Event::PhaseSkipped {
            from: PhaseKind::Focus,
            to: PhaseKind::LongBreak,
            at,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_skipped");
        assert_eq!(json["from"], "focus");
        assert_eq!(json["to"], "long_break");
        assert_eq!(event.at(), at);
    }
}
