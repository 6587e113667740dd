//! Per-feed refresh timers.
//!
//! Each feed kind has at most one live timer. Scheduling a timer cancels
//! the previous one of the same kind. A canceled timer never takes effect:
//! its task is aborted, and if its message was already queued, the stale
//! generation is rejected by [`RefreshTimers::claim`].

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

/// The three independently refreshed documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Manifest,
    Information,
    Status,
}

/// Identifies one scheduled firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    kind: FeedKind,
    generation: u64,
}

struct Slot {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Which feed kinds currently have a live timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingTimers {
    pub manifest: bool,
    pub information: bool,
    pub status: bool,
}

#[derive(Default)]
pub struct RefreshTimers {
    slots: HashMap<FeedKind, Slot>,
    next_generation: u64,
}

impl RefreshTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fire` after `delay`, replacing any live timer of `kind`.
    pub fn schedule(
        &mut self,
        kind: FeedKind,
        delay: Duration,
        fire: impl FnOnce(TimerToken) + Send + 'static,
    ) {
        self.cancel(kind);

        self.next_generation += 1;
        let token = TimerToken {
            kind,
            generation: self.next_generation,
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire(token);
        });

        self.slots.insert(
            kind,
            Slot {
                generation: token.generation,
                handle,
            },
        );
    }

    /// Cancel the live timer of `kind`, if any. Returns whether one existed.
    pub fn cancel(&mut self, kind: FeedKind) -> bool {
        match self.slots.remove(&kind) {
            Some(slot) => {
                slot.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.handle.abort();
        }
    }

    /// Accept a fired timer if it is still the live one for its kind.
    ///
    /// A claimed timer is no longer live. Tokens from canceled or replaced
    /// timers are rejected.
    pub fn claim(&mut self, token: TimerToken) -> bool {
        match self.slots.get(&token.kind) {
            Some(slot) if slot.generation == token.generation => {
                self.slots.remove(&token.kind);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, kind: FeedKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub fn pending(&self) -> PendingTimers {
        PendingTimers {
            manifest: self.is_pending(FeedKind::Manifest),
            information: self.is_pending(FeedKind::Information),
            status: self.is_pending(FeedKind::Status),
        }
    }
}

impl Drop for RefreshTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = RefreshTimers::new();

        timers.schedule(FeedKind::Status, Duration::from_secs(10), move |t| {
            let _ = tx.send(t);
        });
        assert!(timers.is_pending(FeedKind::Status));

        let token = rx.recv().await.unwrap();
        assert!(timers.claim(token));
        assert!(!timers.is_pending(FeedKind::Status));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_supersedes_previous_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = RefreshTimers::new();

        let first = tx.clone();
        timers.schedule(FeedKind::Information, Duration::from_secs(10), move |t| {
            let _ = first.send((1, t));
        });
        timers.schedule(FeedKind::Information, Duration::from_secs(20), move |t| {
            let _ = tx.send((2, t));
        });

        // Only the replacement ever fires
        let (which, token) = rx.recv().await.unwrap();
        assert_eq!(which, 2);
        assert!(timers.claim(token));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_token_is_rejected() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timers = RefreshTimers::new();

        let first = tx.clone();
        timers.schedule(FeedKind::Manifest, Duration::from_secs(1), move |t| {
            let _ = first.send(t);
        });
        let stale = rx.recv().await.unwrap();

        // Replaced after the message was queued but before it was claimed
        timers.schedule(FeedKind::Manifest, Duration::from_secs(60), move |t| {
            let _ = tx.send(t);
        });

        assert!(!timers.claim(stale));
        assert!(timers.is_pending(FeedKind::Manifest));
    }

    #[tokio::test(start_paused = true)]
    async fn kinds_are_independent() {
        let mut timers = RefreshTimers::new();
        timers.schedule(FeedKind::Information, Duration::from_secs(5), |_| {});
        timers.schedule(FeedKind::Status, Duration::from_secs(5), |_| {});

        assert!(timers.cancel(FeedKind::Status));
        assert!(!timers.cancel(FeedKind::Status));
        assert_eq!(
            timers.pending(),
            PendingTimers {
                manifest: false,
                information: true,
                status: false,
            }
        );

        timers.cancel_all();
        assert_eq!(timers.pending(), PendingTimers::default());
    }
}
