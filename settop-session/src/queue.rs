//! Ordered mailbox of pending key events for one session

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::command::KeyEvent;

struct QueueInner {
    events: VecDeque<KeyEvent>,
    /// Pending out-of-band wakeup (cancellation), consumed by one waiter
    wake: bool,
}

/// Thread-safe FIFO of pending key events
///
/// Dispatching callers push; the session's worker drains whole batches so
/// new dispatches are never blocked behind in-flight delivery. The queue is
/// also the worker's parking spot: [`EventQueue::wait_until`] blocks until
/// new work arrives, a wakeup is requested, or a deadline passes, which is
/// what keeps the worker loop from spinning.
pub struct EventQueue {
    inner: Mutex<QueueInner>,
    available: Condvar,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                events: VecDeque::new(),
                wake: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append an event and rouse a parked worker
    pub fn push(&self, event: KeyEvent) {
        let mut inner = self.inner.lock();
        inner.events.push_back(event);
        self.available.notify_all();
    }

    /// Atomically move every pending event out, in FIFO order
    pub fn drain(&self) -> Vec<KeyEvent> {
        let mut inner = self.inner.lock();
        inner.events.drain(..).collect()
    }

    /// Discard all pending events
    ///
    /// Used on the transition to disconnected so stale input is not replayed
    /// into the next connection.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.events.len();
        inner.events.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "cleared pending key events");
        }
    }

    /// Rouse a parked worker without enqueueing anything
    pub fn wake(&self) {
        let mut inner = self.inner.lock();
        inner.wake = true;
        self.available.notify_all();
    }

    /// Park until events are pending, a wakeup arrives, or `deadline` passes
    pub fn wait_until(&self, deadline: Instant) {
        let mut inner = self.inner.lock();
        loop {
            if !inner.events.is_empty() || inner.wake {
                inner.wake = false;
                return;
            }
            if self.available.wait_until(&mut inner, deadline).timed_out() {
                return;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
