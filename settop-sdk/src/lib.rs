//! # settop-sdk
//!
//! A sync-first SDK for remote-controlling network-attached set-top boxes.
//!
//! ## Overview
//!
//! Every configured box gets its own session with a background worker that
//! owns the device link: connecting with retries, delivering queued key
//! events in dispatch order, heartbeat-polling for liveness, and shutting
//! itself down when nobody is watching and nothing is happening. Callers
//! interact through two fire-and-forget operations (dispatch a command,
//! subscribe to state changes) and never block on device I/O or see a
//! device error directly.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use settop_sdk::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryDeviceStore::new());
//! store.insert(DeviceInfo::new("living-room", "Living Room", "10.0.0.2:5900"));
//!
//! // any DriverFactory implementation for the box's wire protocol
//! let sdk = RemoteSdk::new(store, drivers);
//!
//! let id = DeviceId::new("living-room");
//! sdk.register_subscriber(&id, subscriber_fn(|id, state| {
//!     println!("{id} is now {state}");
//! }));
//! sdk.press(&id, KeyCode::CHANNEL_UP);
//! ```
//!
//! ## Crates
//!
//! - `settop-session`: session orchestration (the interesting part)
//! - `settop-driver`: the driver contract a wire protocol implements
//! - `settop-store`: device configuration storage

use std::sync::Arc;

// Re-exports
pub use settop_driver::{
    ConnectionState, DriverError, DriverFactory, KeyCode, RemoteDriver, DEFAULT_PORT,
};
pub use settop_session::{
    init_logging, init_logging_from_env, subscriber_fn, Command, KeyAction, KeyEvent,
    LoggingError, LoggingMode, Session, SessionConfig, SessionRegistry, StateSubscriber,
    SubscriberGone,
};
pub use settop_store::{
    DeviceId, DeviceInfo, DeviceStore, JsonDeviceStore, MemoryDeviceStore, StoreError,
};

/// The assembled SDK: a session registry wired to its collaborators
///
/// This is the composition root: construct it once with a device store and a
/// driver factory, then hand clones of it (it is cheap to clone) to whatever
/// drives the UI.
#[derive(Clone)]
pub struct RemoteSdk {
    registry: Arc<SessionRegistry>,
}

impl RemoteSdk {
    /// Assemble the SDK with default session timing
    pub fn new(store: Arc<dyn DeviceStore>, drivers: Arc<dyn DriverFactory>) -> Self {
        Self::with_config(store, drivers, SessionConfig::default())
    }

    /// Assemble the SDK with custom session timing
    pub fn with_config(
        store: Arc<dyn DeviceStore>,
        drivers: Arc<dyn DriverFactory>,
        config: SessionConfig,
    ) -> Self {
        tracing::debug!("assembling settop-sdk");
        Self {
            registry: Arc::new(SessionRegistry::with_config(store, drivers, config)),
        }
    }

    /// Fire-and-forget command dispatch
    pub fn dispatch(&self, id: &DeviceId, command: Command) {
        self.registry.dispatch(id, command);
    }

    /// Press and release a key
    pub fn press(&self, id: &DeviceId, key: KeyCode) {
        self.dispatch(id, Command::KeyPress(key));
    }

    /// Hold or release a key
    pub fn send_key(&self, id: &DeviceId, key: KeyCode, down: bool) {
        self.dispatch(
            id,
            if down {
                Command::KeyDown(key)
            } else {
                Command::KeyUp(key)
            },
        );
    }

    /// Reconnect the device's session; `force` restarts even a healthy link
    pub fn reconnect(&self, id: &DeviceId, force: bool) {
        self.dispatch(id, Command::Reconnect { force });
    }

    /// Observe a device's connection state
    pub fn register_subscriber(&self, id: &DeviceId, sub: Arc<dyn StateSubscriber>) {
        self.registry.register_subscriber(id, sub);
    }

    /// Stop observing a device's connection state
    pub fn unregister_subscriber(&self, id: &DeviceId, sub: &Arc<dyn StateSubscriber>) {
        self.registry.unregister_subscriber(id, sub);
    }

    /// Current connection state of a device
    pub fn state(&self, id: &DeviceId) -> ConnectionState {
        self.registry.state(id)
    }

    /// The underlying session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::RemoteSdk;
    pub use settop_driver::{
        ConnectionState, DriverError, DriverFactory, KeyCode, RemoteDriver,
    };
    pub use settop_session::{subscriber_fn, Command, SessionConfig, StateSubscriber};
    pub use settop_store::{
        DeviceId, DeviceInfo, DeviceStore, JsonDeviceStore, MemoryDeviceStore,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use settop_driver::testing::ScriptedFactory;

    fn sdk() -> RemoteSdk {
        RemoteSdk::new(
            Arc::new(MemoryDeviceStore::new()),
            Arc::new(ScriptedFactory::new()),
        )
    }

    #[test]
    fn test_unknown_device_reads_disconnected() {
        let sdk = sdk();
        assert_eq!(
            sdk.state(&DeviceId::new("nowhere")),
            ConnectionState::Disconnected
        );
    }

    #[test]
    fn test_clones_share_the_registry() {
        let sdk = sdk();
        let other = sdk.clone();
        let id = DeviceId::new("box-1");

        let session = sdk.registry().session(&id);
        assert!(Arc::ptr_eq(&session, &other.registry().session(&id)));
    }
}
