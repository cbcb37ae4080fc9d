use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::schedule::PhaseKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// Not counting down; remaining duration is frozen.
    Idle,
    Running,
    /// Remaining reached zero. Transient: the next phase follows immediately.
    Finished,
}

/// Immutable snapshot published to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: PhaseKind,
    pub status: PhaseStatus,
    #[serde(rename = "remaining_ms", with = "duration_ms")]
    pub remaining: Duration,
}

impl TimerState {
    pub fn idle(phase: PhaseKind, remaining: Duration) -> Self {
        Self {
            phase,
            status: PhaseStatus::Idle,
            remaining,
        }
    }

    pub fn running(phase: PhaseKind, remaining: Duration) -> Self {
        Self {
            phase,
            status: PhaseStatus::Running,
            remaining,
        }
    }

    pub fn finished(phase: PhaseKind) -> Self {
        Self {
            phase,
            status: PhaseStatus::Finished,
            remaining: Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == PhaseStatus::Running
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
