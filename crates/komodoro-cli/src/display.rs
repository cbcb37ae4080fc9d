//! Terminal rendering of timer snapshots.

use std::time::Duration;

use komodoro_core::{PhaseStatus, TimerState};
use serde::Serialize;

/// `m:ss`, minutes unbounded.
pub fn format_remaining(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn render_state(state: &TimerState, cycles: u32, pomodoro_max: u32) -> String {
    let status = match state.status {
        PhaseStatus::Idle => "paused",
        PhaseStatus::Running => "running",
        PhaseStatus::Finished => "finished",
    };
    format!(
        "{:<11} {:<8} {:>6}  [{}/{}]",
        state.phase.label(),
        status,
        format_remaining(state.remaining),
        cycles,
        pomodoro_max
    )
}

/// One JSON object per snapshot.
#[derive(Serialize)]
pub struct JsonLine<'a> {
    #[serde(flatten)]
    pub state: &'a TimerState,
    pub cycles: u32,
}
