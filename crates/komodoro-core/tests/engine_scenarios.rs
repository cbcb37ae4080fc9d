//! End-to-end timing scenarios for the async engine.
//!
//! All tests run on a paused tokio clock, so a 1 s tick completes instantly
//! while keeping exact elapsed-time accounting.

use std::time::Duration;

use komodoro_core::{Event, PhaseKind, PhaseStatus, PomodoroEngine, TimerConfig, TimerState};
use tokio::time::{self, Instant};

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn config(focus: u64, short: u64, long: u64, max: u32) -> TimerConfig {
    TimerConfig::new(secs(focus), secs(short), secs(long), max).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_first_tick_after_one_interval() {
    let engine = PomodoroEngine::new(config(3, 5, 15, 4)).unwrap();
    let mut states = engine.subscribe_state();
    assert_eq!(states.recv().await, Some(TimerState::idle(PhaseKind::Focus, secs(3))));

    let begin = Instant::now();
    engine.start();
    assert_eq!(states.recv().await, Some(TimerState::running(PhaseKind::Focus, secs(3))));
    assert_eq!(states.recv().await, Some(TimerState::running(PhaseKind::Focus, secs(2))));
    assert_eq!(begin.elapsed(), secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_completion_then_short_break() {
    let engine = PomodoroEngine::new(config(1, 5, 15, 4)).unwrap();
    let mut states = engine.subscribe_state();
    states.recv().await;

    engine.start();
    assert_eq!(states.recv().await, Some(TimerState::running(PhaseKind::Focus, secs(1))));
    assert_eq!(states.recv().await, Some(TimerState::finished(PhaseKind::Focus)));
    assert_eq!(
        states.recv().await,
        Some(TimerState::running(PhaseKind::ShortBreak, secs(5)))
    );
    assert_eq!(engine.cycles(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_cycle_goes_to_long_break() {
    let engine = PomodoroEngine::new(config(1, 5, 2, 1)).unwrap();
    let mut states = engine.subscribe_state();
    states.recv().await;

    engine.start();
    states.recv().await;
    assert_eq!(states.recv().await, Some(TimerState::finished(PhaseKind::Focus)));
    assert_eq!(
        states.recv().await,
        Some(TimerState::running(PhaseKind::LongBreak, secs(2)))
    );
    assert_eq!(engine.cycles(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_short_break() {
    let engine = PomodoroEngine::new(config(1, 5, 15, 4)).unwrap();
    let mut states = engine.subscribe_state();
    states.recv().await;

    engine.next();
    assert_eq!(
        states.recv().await,
        Some(TimerState::running(PhaseKind::ShortBreak, secs(5)))
    );
    assert_eq!(states.recv().await, Some(TimerState::running(PhaseKind::ShortBreak, secs(4))));
    assert_eq!(states.recv().await, Some(TimerState::running(PhaseKind::ShortBreak, secs(3))));

    engine.pause();
    assert_eq!(states.recv().await, Some(TimerState::idle(PhaseKind::ShortBreak, secs(3))));

    time::sleep(secs(30)).await;
    assert_eq!(states.try_recv(), None);
    assert_eq!(engine.state(), TimerState::idle(PhaseKind::ShortBreak, secs(3)));

    engine.start();
    assert_eq!(states.recv().await, Some(TimerState::running(PhaseKind::ShortBreak, secs(3))));
    assert_eq!(states.recv().await, Some(TimerState::running(PhaseKind::ShortBreak, secs(2))));
}

#[tokio::test(start_paused = true)]
async fn test_next_while_idle_runs_following_phase() {
    let engine = PomodoroEngine::new(config(10, 5, 15, 4)).unwrap();
    let mut states = engine.subscribe_state();
    let mut cycles = engine.subscribe_cycles();
    states.recv().await;
    assert_eq!(cycles.recv().await, Some(0));

    engine.next();
    assert_eq!(
        states.recv().await,
        Some(TimerState::running(PhaseKind::ShortBreak, secs(5)))
    );
    assert_eq!(cycles.recv().await, Some(1));

    let long = PomodoroEngine::new(config(10, 5, 15, 1)).unwrap();
    let mut states = long.subscribe_state();
    states.recv().await;
    long.next();
    assert_eq!(
        states.recv().await,
        Some(TimerState::running(PhaseKind::LongBreak, secs(15)))
    );
}

#[tokio::test(start_paused = true)]
async fn test_countdown_round_trip() {
    let engine = PomodoroEngine::new(config(4, 2, 3, 4)).unwrap();
    let mut states = engine.subscribe_state();
    states.recv().await;

    engine.start();
    let mut seen = Vec::new();
    for _ in 0..6 {
        seen.push(states.recv().await.unwrap());
    }
    assert_eq!(
        seen,
        vec![
            TimerState::running(PhaseKind::Focus, secs(4)),
            TimerState::running(PhaseKind::Focus, secs(3)),
            TimerState::running(PhaseKind::Focus, secs(2)),
            TimerState::running(PhaseKind::Focus, secs(1)),
            TimerState::finished(PhaseKind::Focus),
            TimerState::running(PhaseKind::ShortBreak, secs(2)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_resets_and_silences_clock() {
    let engine = PomodoroEngine::new(config(2, 3, 4, 4)).unwrap();
    let mut states = engine.subscribe_state();
    states.recv().await;

    engine.next();
    engine.next();
    engine.next();
    engine.stop();

    let mut last = None;
    while let Some(state) = states.try_recv() {
        last = Some(state);
    }
    // Commands may not all be applied yet; wait for the reset snapshot.
    while last != Some(TimerState::idle(PhaseKind::Focus, secs(2))) {
        last = states.recv().await;
    }
    assert_eq!(engine.cycles(), 0);

    time::sleep(secs(60)).await;
    assert_eq!(states.try_recv(), None);
}

#[tokio::test(start_paused = true)]
async fn test_short_breaks_between_long_breaks() {
    let max = 3;
    let engine = PomodoroEngine::new(config(1, 1, 1, max)).unwrap();
    let mut states = engine.subscribe_state();
    states.recv().await;
    engine.start();

    // Phase entries are the Running snapshots following a Finished one.
    let mut entries = Vec::new();
    let mut after_finish = false;
    while entries.iter().filter(|p| **p == PhaseKind::LongBreak).count() < 3 {
        let state = states.recv().await.unwrap();
        assert!(state.status != PhaseStatus::Finished || state.remaining.is_zero());
        if after_finish {
            entries.push(state.phase);
        }
        after_finish = state.status == PhaseStatus::Finished;
    }

    let long_positions: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, p)| **p == PhaseKind::LongBreak)
        .map(|(i, _)| i)
        .collect();
    for pair in long_positions.windows(2) {
        let between = &entries[pair[0] + 1..pair[1]];
        let shorts = between.iter().filter(|p| **p == PhaseKind::ShortBreak).count();
        assert_eq!(shorts, (max - 1) as usize);
    }
}

#[tokio::test(start_paused = true)]
async fn test_events_follow_transitions() {
    let engine = PomodoroEngine::new(config(1, 5, 15, 4)).unwrap();
    let mut events = engine.subscribe_events();

    engine.start();
    assert!(matches!(
        events.recv().await.unwrap(),
        Event::TimerStarted { phase: PhaseKind::Focus, remaining_ms: 1000, .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        Event::PhaseCompleted { phase: PhaseKind::Focus, cycles: 0, .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        Event::PhaseStarted { phase: PhaseKind::ShortBreak, duration_ms: 5000, cycles: 1, .. }
    ));

    engine.next();
    assert!(matches!(
        events.recv().await.unwrap(),
        Event::PhaseSkipped { from: PhaseKind::ShortBreak, to: PhaseKind::Focus, .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        Event::PhaseStarted { phase: PhaseKind::Focus, .. }
    ));

    engine.pause();
    assert!(matches!(events.recv().await.unwrap(), Event::TimerPaused { .. }));
    engine.stop();
    assert!(matches!(events.recv().await.unwrap(), Event::TimerReset { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_restart_does_not_leak_stale_ticks() {
    let engine = PomodoroEngine::new(config(5, 5, 15, 4)).unwrap();
    let mut states = engine.subscribe_state();
    states.recv().await;

    engine.start();
    states.recv().await;
    time::sleep(Duration::from_millis(1500)).await;
    engine.start();

    // A second start restarts the countdown from the last ticked value.
    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(states.recv().await.unwrap());
    }
    assert_eq!(
        seen,
        vec![
            TimerState::running(PhaseKind::Focus, secs(4)),
            TimerState::running(PhaseKind::Focus, secs(4)),
            TimerState::running(PhaseKind::Focus, secs(3)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropping_engine_closes_streams() {
    let engine = PomodoroEngine::new(config(5, 5, 15, 4)).unwrap();
    let mut states = engine.subscribe_state();
    engine.start();
    drop(engine);

    while states.recv().await.is_some() {}
    assert_eq!(states.try_recv(), None);
}
