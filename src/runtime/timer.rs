//! Timers delivered through the message pump.
//!
//! A timer is a spawned tokio sleep that posts [`PumpEvent::TimerFired`]
//! back into the pump's queue when it elapses. Cancellation is cooperative:
//! the handle flips a flag and an elapsed-but-cancelled timer fires nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use super::pump::PumpEvent;

// ---------------------------------------------------------------------------
// TimerId / TimerHandle
// ---------------------------------------------------------------------------

/// Identifies a timer across its lifetime. Never reused within a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Owner-side handle to a running timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: TimerId,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Stop the timer. If it already fired the event is still in the queue;
    /// if not, it never will be.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Spawn a one-shot timer that posts to `events` after `delay`.
///
/// Requires a tokio runtime.
pub(super) fn spawn_timer(
    id: TimerId,
    delay: Duration,
    events: UnboundedSender<PumpEvent>,
) -> TimerHandle {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if flag.load(Ordering::Relaxed) {
            trace!(?id, "timer cancelled before firing");
            return;
        }
        // Receiver gone means the pump shut down; nothing to do.
        let _ = events.send(PumpEvent::TimerFired(id));
    });
    TimerHandle { id, cancelled }
}

// ===========================================================================
// Tests
// ===========================================================================
