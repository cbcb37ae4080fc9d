//! Replay-latest observable values.
//!
//! An [`Observable`] keeps the most recent value and broadcasts every new one.
//! A [`Subscription`] first yields the value current at subscribe time, then
//! every later publication in order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

struct Shared<T> {
    latest: T,
    tx: broadcast::Sender<T>,
}

pub struct Observable<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T: Clone> Observable<T> {
    /// `capacity` bounds how far a subscriber may fall behind before it
    /// starts losing values.
    pub fn new(initial: T, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Mutex::new(Shared { latest: initial, tx })),
        }
    }

    pub fn get(&self) -> T {
        self.lock().latest.clone()
    }

    pub fn publish(&self, value: T) {
        let mut shared = self.lock();
        shared.latest = value.clone();
        // No subscribers is fine; the latest value is still kept.
        let _ = shared.tx.send(value);
    }

    pub fn subscribe(&self) -> Subscription<T> {
        // Read and subscribe under one lock so no publication falls in between.
        let shared = self.lock();
        Subscription {
            pending: Some(shared.latest.clone()),
            rx: shared.tx.subscribe(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared<T>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("latest", &self.get())
            .finish()
    }
}

#[derive(Debug)]
pub struct Subscription<T> {
    pending: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Wait for the next value. Returns `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(value) = self.pending.take() {
            return Some(value);
        }
        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged behind, values dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next value if one is already available.
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(value) = self.pending.take() {
            return Some(value);
        }
        loop {
            match self.rx.try_recv() {
                Ok(value) => return Some(value),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged behind, values dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
