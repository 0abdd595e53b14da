//! Cooperative background-task cancellation.
//!
//! A [`TaskHandle`] is a cheap clonable token shared between a spawned task
//! and its owner. The owner flips the flag; the task notices at its next
//! [`checkpoint`](TaskHandle::checkpoint) and unwinds with `?`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Cancelled;

/// Shared cancellation token for a background task.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; the task stops at its next
    /// checkpoint, not immediately.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancellation point. Call between units of work:
    ///
    /// ```ignore
    /// for chunk in work {
    ///     handle.checkpoint()?;
    ///     process(chunk);
    /// }
    /// ```
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_passes_until_cancelled() {
        let handle = TaskHandle::new();
        assert_eq!(handle.checkpoint(), Ok(()));
        handle.cancel();
        assert_eq!(handle.checkpoint(), Err(Cancelled));
        handle.cancel();
        assert_eq!(handle.checkpoint(), Err(Cancelled));
    }

    #[test]
    fn clones_share_the_flag() {
        let handle = TaskHandle::new();
        let clone = handle.clone();
        handle.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn loop_stops_at_checkpoint() {
        let handle = TaskHandle::new();
        let mut done = 0;
        let result: Result<(), Cancelled> = (0..10).try_for_each(|i| {
            handle.checkpoint()?;
            done += 1;
            if i == 2 {
                handle.cancel();
            }
            Ok(())
        });
        assert_eq!(result, Err(Cancelled));
        assert_eq!(done, 3);
    }
}
