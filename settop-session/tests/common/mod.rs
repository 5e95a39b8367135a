//! Shared fixtures for session integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use settop_driver::testing::{DriverProbe, ScriptedFactory};
use settop_session::{
    ConnectionState, DeviceId, SessionConfig, SessionRegistry, StateSubscriber, SubscriberGone,
};
use settop_store::{DeviceInfo, MemoryDeviceStore};

pub const DEVICE: &str = "living-room";
pub const ADDRESS: &str = "10.0.0.2:5900";

/// Millisecond-scale timings so lifecycle tests run quickly
pub fn test_config() -> SessionConfig {
    SessionConfig {
        retry_count: 3,
        retry_backoff: Duration::from_millis(10),
        poll_interval: Duration::from_millis(40),
        inactivity_timeout: Duration::from_millis(150),
        restart_join_timeout: Duration::from_millis(200),
    }
}

/// Registry with one configured device and a scripted driver behind it
pub fn fixture() -> (SessionRegistry, DriverProbe, DeviceId) {
    fixture_with(test_config())
}

pub fn fixture_with(config: SessionConfig) -> (SessionRegistry, DriverProbe, DeviceId) {
    let store = MemoryDeviceStore::new();
    store.insert(DeviceInfo::new(DEVICE, "Living Room", ADDRESS));

    let factory = ScriptedFactory::new();
    let probe = factory.probe();

    let registry = SessionRegistry::with_config(Arc::new(store), Arc::new(factory), config);
    (registry, probe, DeviceId::new(DEVICE))
}

/// Registry whose store knows no devices at all
pub fn unconfigured_fixture() -> (SessionRegistry, DriverProbe, DeviceId) {
    let factory = ScriptedFactory::new();
    let probe = factory.probe();
    let registry = SessionRegistry::with_config(
        Arc::new(MemoryDeviceStore::new()),
        Arc::new(factory),
        test_config(),
    );
    (registry, probe, DeviceId::new(DEVICE))
}

/// Poll `pred` every few milliseconds until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    pred()
}

/// Subscriber that records every state it is notified of
pub struct Recorder {
    states: Mutex<Vec<ConnectionState>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(Vec::new()),
        })
    }

    pub fn states(&self) -> Vec<ConnectionState> {
        self.states.lock().unwrap().clone()
    }

    pub fn wait_for(&self, state: ConnectionState, timeout: Duration) -> bool {
        wait_until(timeout, || self.states().contains(&state))
    }

    pub fn wait_for_last(&self, state: ConnectionState, timeout: Duration) -> bool {
        wait_until(timeout, || self.states().last() == Some(&state))
    }
}

impl StateSubscriber for Recorder {
    fn notify(&self, _id: &DeviceId, state: ConnectionState) -> Result<(), SubscriberGone> {
        self.states.lock().unwrap().push(state);
        Ok(())
    }
}

/// Subscriber that accepts its first `allow` notifications, then always fails
pub struct Flaky {
    allow: usize,
    notified: AtomicUsize,
}

impl Flaky {
    pub fn allow(allow: usize) -> Arc<Self> {
        Arc::new(Self {
            allow,
            notified: AtomicUsize::new(0),
        })
    }

    pub fn notifications(&self) -> usize {
        self.notified.load(Ordering::SeqCst)
    }
}

impl StateSubscriber for Flaky {
    fn notify(&self, _id: &DeviceId, _state: ConnectionState) -> Result<(), SubscriberGone> {
        let n = self.notified.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.allow {
            Ok(())
        } else {
            Err(SubscriberGone::new("scripted failure"))
        }
    }
}
