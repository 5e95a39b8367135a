//! State-change subscribers and the per-session subscriber set

use std::sync::Arc;

use parking_lot::Mutex;
use settop_driver::ConnectionState;
use settop_store::DeviceId;
use thiserror::Error;

/// Returned by a subscriber whose callback channel has died
///
/// The session layer reacts by pruning the subscriber; the error itself is
/// never surfaced anywhere.
#[derive(Debug, Error)]
#[error("subscriber is unreachable: {reason}")]
pub struct SubscriberGone {
    reason: String,
}

impl SubscriberGone {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An observer of one session's connection state
///
/// `notify` is invoked from the session's worker thread and, on
/// registration, from the registering caller's thread. Implementations must
/// return promptly and must not call back into the session or registry from
/// inside `notify`; doing so can deadlock the broadcast.
pub trait StateSubscriber: Send + Sync {
    fn notify(&self, id: &DeviceId, state: ConnectionState) -> Result<(), SubscriberGone>;
}

/// Wrap a closure as a [`StateSubscriber`]
///
/// The closure variant for observers that cannot fail; a `SubscriberGone`
/// can only come from a hand-implemented subscriber.
pub fn subscriber_fn<F>(f: F) -> Arc<dyn StateSubscriber>
where
    F: Fn(&DeviceId, ConnectionState) + Send + Sync + 'static,
{
    struct FnSubscriber<F>(F);

    impl<F> StateSubscriber for FnSubscriber<F>
    where
        F: Fn(&DeviceId, ConnectionState) + Send + Sync,
    {
        fn notify(&self, id: &DeviceId, state: ConnectionState) -> Result<(), SubscriberGone> {
            (self.0)(id, state);
            Ok(())
        }
    }

    Arc::new(FnSubscriber(f))
}

/// The set of observers registered for one session
///
/// All operations hold the set's lock across callback delivery, which
/// linearizes registration against broadcasts: a subscriber added mid-flight
/// sees the current state exactly once before any later broadcast. Broadcasts
/// iterate a snapshot and apply prunes afterwards, so a failing member can
/// never disturb delivery to the rest.
pub struct SubscriberSet {
    subscribers: Mutex<Vec<Arc<dyn StateSubscriber>>>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register `sub` and synchronously deliver the current state
    ///
    /// `current_state` is read under the set lock. If the initial delivery
    /// fails the subscriber is already dead and is not retained.
    pub fn add(
        &self,
        id: &DeviceId,
        sub: Arc<dyn StateSubscriber>,
        current_state: impl FnOnce() -> ConnectionState,
    ) {
        let mut subscribers = self.subscribers.lock();
        let state = current_state();
        match sub.notify(id, state) {
            Ok(()) => {
                subscribers.push(sub);
                tracing::debug!(id = %id, %state, "registered subscriber");
            }
            Err(err) => {
                tracing::debug!(id = %id, error = %err, "dropped dead subscriber at registration");
            }
        }
    }

    /// Remove `sub` if present; identity is pointer equality
    pub fn remove(&self, sub: &Arc<dyn StateSubscriber>) {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| !Arc::ptr_eq(s, sub));
        if subscribers.len() < before {
            tracing::debug!("unregistered subscriber");
        }
    }

    /// Deliver `state` to every member, pruning members that fail
    pub fn broadcast(&self, id: &DeviceId, state: ConnectionState) {
        let mut subscribers = self.subscribers.lock();
        let snapshot: Vec<Arc<dyn StateSubscriber>> = subscribers.clone();
        let mut dead = Vec::new();

        for sub in &snapshot {
            if let Err(err) = sub.notify(id, state) {
                tracing::debug!(id = %id, error = %err, "pruning dead subscriber");
                dead.push(Arc::clone(sub));
            }
        }

        if !dead.is_empty() {
            subscribers.retain(|s| !dead.iter().any(|d| Arc::ptr_eq(s, d)));
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}

impl Default for SubscriberSet {
    fn default() -> Self {
        Self::new()
    }
}
