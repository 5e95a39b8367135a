//! The lookup contract consumed by the session layer

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::device::{DeviceId, DeviceInfo};

/// Read access to persisted device configuration
///
/// Workers resolve the address of their device through this trait at start
/// time; a missing entry means the session gives up immediately without
/// retrying.
pub trait DeviceStore: Send + Sync {
    /// Configuration for `id`, if any is stored
    fn lookup(&self, id: &DeviceId) -> Option<DeviceInfo>;

    /// Every configured device
    fn devices(&self) -> Vec<DeviceInfo>;
}

/// In-memory device store
///
/// The store used by tests and by applications that manage their own device
/// list elsewhere.
#[derive(Default)]
pub struct MemoryDeviceStore {
    devices: RwLock<HashMap<DeviceId, DeviceInfo>>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a device entry
    pub fn insert(&self, info: DeviceInfo) {
        self.devices.write().insert(info.id.clone(), info);
    }

    /// Remove a device entry
    pub fn remove(&self, id: &DeviceId) -> Option<DeviceInfo> {
        self.devices.write().remove(id)
    }
}

impl FromIterator<DeviceInfo> for MemoryDeviceStore {
    fn from_iter<I: IntoIterator<Item = DeviceInfo>>(iter: I) -> Self {
        let store = MemoryDeviceStore::new();
        for info in iter {
            store.insert(info);
        }
        store
    }
}

impl DeviceStore for MemoryDeviceStore {
    fn lookup(&self, id: &DeviceId) -> Option<DeviceInfo> {
        self.devices.read().get(id).cloned()
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.read().values().cloned().collect()
    }
}
