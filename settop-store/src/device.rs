//! Device identity and configuration record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a configured set-top box
///
/// Opaque and caller-supplied; the session layer only ever compares and
/// hashes it. Applications typically use a slug ("living-room") or a
/// persisted index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        DeviceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId::new(s)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        DeviceId::new(s)
    }
}

/// Stored configuration for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: DeviceId,
    /// Friendly display name
    pub name: String,
    /// Network address of the box, `host:port`
    pub address: String,
}

impl DeviceInfo {
    /// Display name used when none was configured
    pub const DEFAULT_NAME: &'static str = "Set-top box";

    pub fn new(id: impl Into<DeviceId>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
        }
    }

    /// Configuration with the default display name
    pub fn unnamed(id: impl Into<DeviceId>, address: impl Into<String>) -> Self {
        Self::new(id, Self::DEFAULT_NAME, address)
    }
}
