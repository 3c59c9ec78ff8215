//! Per-point expiry timers.
//!
//! Each point owns one slot. Arming a slot aborts whatever timer it held and
//! bumps its generation; the spawned timer reports back with the generation
//! it was armed with so that a fire racing a reset is recognised as stale.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::debug;

/// Notification posted by a timer that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired {
    pub index: usize,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    handle: Option<AbortHandle>,
}

#[derive(Debug)]
pub struct ExpiryTimers {
    window: Duration,
    slots: Vec<Slot>,
    notify: UnboundedSender<Expired>,
}

impl ExpiryTimers {
    pub fn new(len: usize, window: Duration, notify: UnboundedSender<Expired>) -> Self {
        Self {
            window,
            slots: (0..len).map(|_| Slot::default()).collect(),
            notify,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancels any pending timer for `index` and starts a fresh one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn reset(&mut self, index: usize) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };

        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
        slot.generation += 1;

        let expired = Expired {
            index,
            generation: slot.generation,
        };
        let window = self.window;
        let notify = self.notify.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // receiver gone means the hub is shutting down
            let _ = notify.send(expired);
        });
        slot.handle = Some(task.abort_handle());
        debug!("Expiry armed for point {} ({:?})", index, window);
    }

    /// Consumes a fire. Returns `true` only if it belongs to the timer that is
    /// currently armed for that point.
    pub fn settle(&mut self, expired: Expired) -> bool {
        match self.slots.get_mut(expired.index) {
            Some(slot) if slot.generation == expired.generation && slot.handle.is_some() => {
                slot.handle = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|slot| slot.handle.is_some())
    }

    /// Aborts every pending timer.
    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            if let Some(handle) = slot.handle.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for ExpiryTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
