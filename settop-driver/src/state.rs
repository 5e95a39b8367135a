//! Connection lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a device connection
///
/// Shared between the driver contract ([`crate::RemoteDriver::state`]) and
/// the session layer's broadcasts to subscribers. The integer codes are the
/// wire representation used by presentation layers that cannot carry the
/// enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    /// A worker is attempting to reach the device
    Connecting,
    /// The device link is up and accepting key events
    Connected,
    /// No live link; the session is quiescent
    Disconnected,
    /// The connect retry budget was exhausted without reaching the device
    Failed,
}

impl ConnectionState {
    /// Integer code of this state (0, 1, -1, -2)
    pub fn code(self) -> i8 {
        match self {
            ConnectionState::Connecting => 0,
            ConnectionState::Connected => 1,
            ConnectionState::Disconnected => -1,
            ConnectionState::Failed => -2,
        }
    }

    /// Decode an integer state code
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(ConnectionState::Connecting),
            1 => Some(ConnectionState::Connected),
            -1 => Some(ConnectionState::Disconnected),
            -2 => Some(ConnectionState::Failed),
            _ => None,
        }
    }

    /// True while the link is up
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
