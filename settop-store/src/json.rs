//! JSON-file-backed device store

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::device::{DeviceId, DeviceInfo};
use crate::error::{Result, StoreError};
use crate::store::DeviceStore;

/// Device store persisted as a JSON file
///
/// The whole device list is loaded at open time and rewritten on every
/// mutation; box lists are a handful of entries, so simplicity wins over
/// incremental writes. A missing file opens as an empty store.
pub struct JsonDeviceStore {
    path: PathBuf,
    devices: RwLock<HashMap<DeviceId, DeviceInfo>>,
}

impl JsonDeviceStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let devices = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let list: Vec<DeviceInfo> = serde_json::from_str(&raw)?;
            list.into_iter().map(|info| (info.id.clone(), info)).collect()
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %path.display(), devices = devices.len(), "opened device store");

        Ok(Self {
            path,
            devices: RwLock::new(devices),
        })
    }

    /// Open the store at its default platform location
    pub fn open_default() -> Result<Self> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Self::open(dir.join("settop-sdk").join("devices.json"))
    }

    /// Insert or replace a device entry and persist the change
    pub fn insert(&self, info: DeviceInfo) -> Result<()> {
        let mut devices = self.devices.write();
        devices.insert(info.id.clone(), info);
        self.save(&devices)
    }

    /// Remove a device entry and persist the change
    pub fn remove(&self, id: &DeviceId) -> Result<Option<DeviceInfo>> {
        let mut devices = self.devices.write();
        let removed = devices.remove(id);
        if removed.is_some() {
            self.save(&devices)?;
        }
        Ok(removed)
    }

    /// Where this store persists to
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn save(&self, devices: &HashMap<DeviceId, DeviceInfo>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut list: Vec<&DeviceInfo> = devices.values().collect();
        list.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        fs::write(&self.path, serde_json::to_string_pretty(&list)?)?;
        Ok(())
    }
}

impl DeviceStore for JsonDeviceStore {
    fn lookup(&self, id: &DeviceId) -> Option<DeviceInfo> {
        self.devices.read().get(id).cloned()
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("settop-store-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let path = temp_store_path("missing");
        let _ = fs::remove_file(&path);

        let store = JsonDeviceStore::open(&path).unwrap();
        assert!(store.devices().is_empty());
    }

    #[test]
    fn test_roundtrip_through_reopen() {
        let path = temp_store_path("roundtrip");
        let _ = fs::remove_file(&path);

        let store = JsonDeviceStore::open(&path).unwrap();
        store
            .insert(DeviceInfo::new("box-1", "Living Room", "10.0.0.2:5900"))
            .unwrap();
        store
            .insert(DeviceInfo::new("box-2", "Bedroom", "10.0.0.3:5900"))
            .unwrap();
        drop(store);

        let reopened = JsonDeviceStore::open(&path).unwrap();
        assert_eq!(reopened.devices().len(), 2);
        let info = reopened.lookup(&DeviceId::new("box-2")).unwrap();
        assert_eq!(info.name, "Bedroom");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_remove_persists() {
        let path = temp_store_path("remove");
        let _ = fs::remove_file(&path);

        let store = JsonDeviceStore::open(&path).unwrap();
        store
            .insert(DeviceInfo::unnamed("box-1", "10.0.0.2:5900"))
            .unwrap();
        assert!(store.remove(&DeviceId::new("box-1")).unwrap().is_some());
        drop(store);

        let reopened = JsonDeviceStore::open(&path).unwrap();
        assert!(reopened.devices().is_empty());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupted_file_is_a_format_error() {
        let path = temp_store_path("corrupt");
        fs::write(&path, "not json at all").unwrap();

        match JsonDeviceStore::open(&path) {
            Err(StoreError::Format(_)) => {}
            other => panic!("expected format error, got {:?}", other.map(|_| ())),
        }

        let _ = fs::remove_file(&path);
    }
}
