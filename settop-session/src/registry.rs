//! Device id → session lookup

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use settop_driver::{ConnectionState, DriverFactory};
use settop_store::{DeviceId, DeviceStore};

use crate::command::Command;
use crate::config::SessionConfig;
use crate::session::Session;
use crate::subscriber::StateSubscriber;

/// Lazily populated map of device id to [`Session`]
///
/// The registry guarantees exactly one session per id for its lifetime. Its
/// lock is held only for the lookup-or-insert itself, never across any
/// session or worker operation, so sessions for different devices proceed
/// fully in parallel.
///
/// The registry is the composition root of the orchestration layer: it is
/// constructed explicitly with the store and driver factory collaborators
/// and handed to whatever presentation layer drives it.
pub struct SessionRegistry {
    config: SessionConfig,
    store: Arc<dyn DeviceStore>,
    drivers: Arc<dyn DriverFactory>,
    sessions: Mutex<HashMap<DeviceId, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn DeviceStore>, drivers: Arc<dyn DriverFactory>) -> Self {
        Self::with_config(store, drivers, SessionConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn DeviceStore>,
        drivers: Arc<dyn DriverFactory>,
        config: SessionConfig,
    ) -> Self {
        Self {
            config,
            store,
            drivers,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The session for `id`, created on first use
    pub fn session(&self, id: &DeviceId) -> Arc<Session> {
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get(id) {
            return Arc::clone(session);
        }

        tracing::debug!(id = %id, "creating session");
        let session = Session::new(
            id.clone(),
            self.config.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.drivers),
        );
        sessions.insert(id.clone(), Arc::clone(&session));
        session
    }

    /// Dispatch a command to the device's session, creating it if needed
    pub fn dispatch(&self, id: &DeviceId, command: Command) {
        self.session(id).dispatch(command);
    }

    /// Register an observer on the device's session, creating it if needed
    pub fn register_subscriber(&self, id: &DeviceId, sub: Arc<dyn StateSubscriber>) {
        self.session(id).register_subscriber(sub);
    }

    /// Remove an observer; a session is never created just to unregister
    pub fn unregister_subscriber(&self, id: &DeviceId, sub: &Arc<dyn StateSubscriber>) {
        let session = self.sessions.lock().get(id).map(Arc::clone);
        if let Some(session) = session {
            session.unregister_subscriber(sub);
        }
    }

    /// Current state of the device's session
    ///
    /// Reads without creating a session; an unknown device is simply
    /// disconnected.
    pub fn state(&self, id: &DeviceId) -> ConnectionState {
        self.sessions
            .lock()
            .get(id)
            .map(|session| session.state())
            .unwrap_or(ConnectionState::Disconnected)
    }

    /// Ids of every session created so far
    pub fn session_ids(&self) -> Vec<DeviceId> {
        self.sessions.lock().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settop_driver::testing::ScriptedFactory;
    use settop_store::MemoryDeviceStore;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(MemoryDeviceStore::new()),
            Arc::new(ScriptedFactory::new()),
        )
    }

    #[test]
    fn test_one_session_per_id() {
        let registry = registry();
        let a = registry.session(&DeviceId::new("box-1"));
        let b = registry.session(&DeviceId::new("box-1"));
        let other = registry.session(&DeviceId::new("box-2"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(registry.session_ids().len(), 2);
    }

    #[test]
    fn test_state_does_not_create_sessions() {
        let registry = registry();
        assert_eq!(
            registry.state(&DeviceId::new("box-1")),
            ConnectionState::Disconnected
        );
        assert!(registry.session_ids().is_empty());
    }

    #[test]
    fn test_unregister_does_not_create_sessions() {
        let registry = registry();
        let sub = crate::subscriber::subscriber_fn(|_, _| {});
        registry.unregister_subscriber(&DeviceId::new("box-1"), &sub);
        assert!(registry.session_ids().is_empty());
    }
}
