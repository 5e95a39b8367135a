//! Per-device session: state machine, queue, subscribers, worker handle

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use settop_driver::{ConnectionState, DriverFactory};
use settop_store::{DeviceId, DeviceStore};

use crate::command::Command;
use crate::config::SessionConfig;
use crate::queue::EventQueue;
use crate::subscriber::{StateSubscriber, SubscriberSet};
use crate::worker::{self, WorkerHandle};

/// Orchestration state for one device
///
/// A session owns the device's pending-event queue, its subscriber set, its
/// lifecycle state, and at most one live background worker. Sessions are
/// created lazily by the [`crate::SessionRegistry`] and live for the life of
/// the registry; a worker's exit leaves the session quiescent, ready to be
/// reactivated by the next dispatch or subscription.
///
/// Workers are fenced by a generation counter: each spawned worker gets the
/// next generation, and [`Session::apply_state`] refuses updates from any
/// worker that is no longer current. A worker abandoned by a timed-out
/// forced restart therefore exits without touching shared state.
pub struct Session {
    id: DeviceId,
    config: SessionConfig,
    store: Arc<dyn DeviceStore>,
    drivers: Arc<dyn DriverFactory>,
    state: RwLock<ConnectionState>,
    queue: EventQueue,
    subscribers: SubscriberSet,
    worker: Mutex<Option<WorkerHandle>>,
    generation: AtomicU64,
}

impl Session {
    pub(crate) fn new(
        id: DeviceId,
        config: SessionConfig,
        store: Arc<dyn DeviceStore>,
        drivers: Arc<dyn DriverFactory>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            config,
            store,
            drivers,
            state: RwLock::new(ConnectionState::Disconnected),
            queue: EventQueue::new(),
            subscribers: SubscriberSet::new(),
            worker: Mutex::new(None),
            generation: AtomicU64::new(0),
        })
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Number of pending, undelivered key events
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Generation of the most recently started worker (0 before the first)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Register an observer and make sure a worker is running
    ///
    /// The subscriber synchronously receives the current state before this
    /// call returns; a subscriber whose first delivery fails is discarded.
    pub fn register_subscriber(self: &Arc<Self>, sub: Arc<dyn StateSubscriber>) {
        self.subscribers.add(&self.id, sub, || *self.state.read());
        self.ensure_worker(false);
    }

    /// Remove an observer; the worker keeps running
    pub fn unregister_subscriber(&self, sub: &Arc<dyn StateSubscriber>) {
        self.subscribers.remove(sub);
    }

    /// Fire-and-forget command entry point
    ///
    /// Key commands are queued for the worker; `Reconnect` synchronously
    /// ensures (or with `force`, replaces) the worker. Failures are only
    /// ever observable through subscriber notifications.
    pub fn dispatch(self: &Arc<Self>, command: Command) {
        match command.key_event() {
            None => {
                let force = matches!(command, Command::Reconnect { force: true });
                self.ensure_worker(force);
            }
            Some(event) => {
                self.ensure_worker(false);
                self.queue.push(event);
            }
        }
    }

    /// Start a worker if none is live; with `force_restart`, replace a live one
    ///
    /// A forced restart asks the old worker to stop, wakes it, and waits up
    /// to the configured join timeout. If the worker does not finish in time
    /// it is abandoned; the generation fence keeps it from interfering with
    /// its replacement.
    pub(crate) fn ensure_worker(self: &Arc<Self>, force_restart: bool) {
        let mut slot = self.worker.lock();

        if force_restart {
            if let Some(handle) = slot.take() {
                handle.cancel();
                self.queue.wake();
                if !handle.wait(self.config.restart_join_timeout) {
                    tracing::warn!(
                        id = %self.id,
                        generation = handle.generation(),
                        "worker did not stop within the join timeout, abandoning it"
                    );
                }
            }
        }

        let live = slot.as_ref().is_some_and(|handle| !handle.is_finished());
        if !live {
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::debug!(id = %self.id, generation, "starting session worker");
            *slot = Some(worker::spawn(self, generation));
        }
    }

    /// Record and broadcast a state change on behalf of worker `generation`
    ///
    /// Ignored when the worker has been superseded. A `Disconnected`
    /// transition also discards pending events: queued input is meaningless
    /// once the link is gone.
    pub(crate) fn apply_state(&self, generation: u64, state: ConnectionState) {
        if !self.is_current(generation) {
            tracing::debug!(
                id = %self.id,
                generation,
                %state,
                "suppressing state update from superseded worker"
            );
            return;
        }

        *self.state.write() = state;
        self.subscribers.broadcast(&self.id, state);

        if state == ConnectionState::Disconnected {
            self.queue.clear();
        }
    }

    /// Whether `generation` is still the session's current worker generation
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub(crate) fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &Arc<dyn DeviceStore> {
        &self.store
    }

    pub(crate) fn drivers(&self) -> &Arc<dyn DriverFactory> {
        &self.drivers
    }

    pub(crate) fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub(crate) fn subscribers(&self) -> &SubscriberSet {
        &self.subscribers
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // ask a still-running worker to wind down; nothing left to join into
        if let Some(handle) = self.worker.lock().take() {
            handle.cancel();
            self.queue.wake();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{KeyAction, KeyEvent};
    use crate::subscriber::subscriber_fn;
    use settop_driver::{DriverError, KeyCode, RemoteDriver};
    use settop_store::DeviceInfo;

    struct EmptyStore;

    impl DeviceStore for EmptyStore {
        fn lookup(&self, _id: &DeviceId) -> Option<DeviceInfo> {
            None
        }

        fn devices(&self) -> Vec<DeviceInfo> {
            Vec::new()
        }
    }

    struct NoFactory;

    impl DriverFactory for NoFactory {
        fn open(&self, address: &str) -> Result<Box<dyn RemoteDriver>, DriverError> {
            Err(DriverError::Unreachable {
                address: address.to_string(),
            })
        }
    }

    fn quiescent_session() -> Arc<Session> {
        Session::new(
            DeviceId::new("box-1"),
            SessionConfig::default(),
            Arc::new(EmptyStore),
            Arc::new(NoFactory),
        )
    }

    fn press(raw: u16) -> KeyEvent {
        KeyEvent::new(KeyAction::Press, KeyCode::new(raw))
    }

    #[test]
    fn test_fresh_session_is_disconnected() {
        let session = quiescent_session();
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.generation(), 0);
        assert_eq!(session.queued_events(), 0);
    }

    #[test]
    fn test_apply_state_broadcasts_and_stores() {
        let session = quiescent_session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            session
                .subscribers()
                .add(session.id(), subscriber_fn(move |_, s| seen.lock().push(s)), || {
                    ConnectionState::Disconnected
                });
        }

        session.apply_state(0, ConnectionState::Connecting);
        session.apply_state(0, ConnectionState::Connected);

        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(
            *seen.lock(),
            vec![
                ConnectionState::Disconnected,
                ConnectionState::Connecting,
                ConnectionState::Connected,
            ]
        );
    }

    #[test]
    fn test_disconnected_clears_pending_events() {
        let session = quiescent_session();
        session.queue().push(press(1));
        session.queue().push(press(2));

        session.apply_state(0, ConnectionState::Disconnected);
        assert_eq!(session.queued_events(), 0);
    }

    #[test]
    fn test_superseded_generation_is_fenced_out() {
        let session = quiescent_session();
        session.queue().push(press(1));

        // a worker from a generation that is not current has no effect
        session.apply_state(7, ConnectionState::Connected);
        assert_eq!(session.state(), ConnectionState::Disconnected);

        session.apply_state(7, ConnectionState::Disconnected);
        assert_eq!(session.queued_events(), 1, "stale worker must not clear the queue");

        assert!(session.is_current(0));
        assert!(!session.is_current(7));
    }
}
