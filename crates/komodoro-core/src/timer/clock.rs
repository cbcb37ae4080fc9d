//! Cancellable countdown for a single phase run.
//!
//! A background task counts down one tick at a time and hands every value to
//! the owner through a bounded channel. The owner drains it with
//! [`PhaseClock::next_tick`]. Once [`PhaseClock::cancel`] returns nothing more
//! is delivered, including values that were already buffered.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::error::ClockError;

#[derive(Debug)]
pub struct PhaseClock {
    rx: mpsc::Receiver<Duration>,
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    cancelled: bool,
    finished: bool,
}

impl PhaseClock {
    /// Spawn a countdown from `initial` that yields `initial - tick`,
    /// `initial - 2 * tick`, ... down to and including zero.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial` or `tick` is zero.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn start(initial: Duration, tick: Duration) -> Result<Self, ClockError> {
        if initial.is_zero() {
            return Err(ClockError::ZeroDuration);
        }
        if tick.is_zero() {
            return Err(ClockError::ZeroTick);
        }

        let (tx, rx) = mpsc::channel(1);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(countdown(initial, tick, tx, cancel_rx));
        tracing::debug!(?initial, ?tick, "phase clock started");

        Ok(Self {
            rx,
            cancel_tx,
            handle,
            cancelled: false,
            finished: false,
        })
    }

    /// Wait for the next countdown value.
    ///
    /// Returns `None` after the final zero has been delivered or once the
    /// clock is cancelled. Cancel safe.
    pub async fn next_tick(&mut self) -> Option<Duration> {
        if self.cancelled || self.finished {
            return None;
        }
        match self.rx.recv().await {
            Some(remaining) => {
                if remaining.is_zero() {
                    self.finished = true;
                }
                Some(remaining)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    /// Stop the countdown. Idempotent, also after natural completion.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        let _ = self.cancel_tx.send(true);
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        self.handle.abort();
        tracing::debug!("phase clock cancelled");
    }
}

impl Drop for PhaseClock {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn countdown(
    initial: Duration,
    tick: Duration,
    tx: mpsc::Sender<Duration>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut remaining = initial;
    let mut interval = time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !remaining.is_zero() {
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = interval.tick() => {
                remaining = remaining.saturating_sub(tick);
                if tx.send(remaining).await.is_err() {
                    break;
                }
            }
        }
    }
}
