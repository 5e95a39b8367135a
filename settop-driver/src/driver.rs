//! The driver traits the session layer is written against

use thiserror::Error;

use crate::keys::KeyCode;
use crate::state::ConnectionState;

/// Control port the boxes listen on unless configured otherwise
pub const DEFAULT_PORT: u16 = 5900;

/// Errors surfaced by driver implementations
///
/// The session layer absorbs all of these at the worker boundary and turns
/// them into state transitions; they never reach a dispatching caller.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The device address could not be reached at all
    #[error("device at {address} is unreachable")]
    Unreachable { address: String },

    /// The link dropped or misbehaved mid-operation
    #[error("connection I/O error: {0}")]
    Io(String),

    /// The device answered with something the protocol does not allow
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An operation that needs a live link was called without one
    #[error("driver is not connected")]
    NotConnected,
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.to_string())
    }
}

/// One open protocol-level connection to a set-top box
///
/// All calls are synchronous and may block on network I/O. A driver is owned
/// by exactly one session worker for its whole life; implementations do not
/// need to be re-entrant.
pub trait RemoteDriver: Send {
    /// Attempt to (re)establish the link
    ///
    /// A successful return does not imply the link is up; callers consult
    /// [`RemoteDriver::state`] afterwards, mirroring protocols where the
    /// handshake completes asynchronously.
    fn connect(&mut self) -> Result<(), DriverError>;

    /// Tear the link down; best-effort and infallible
    fn disconnect(&mut self);

    /// Current link state as the driver sees it
    fn state(&self) -> ConnectionState;

    /// Send a key transition (`down` true for press, false for release)
    fn send_key(&mut self, code: KeyCode, down: bool) -> Result<(), DriverError>;

    /// Send a full press-and-release of a key
    fn toggle_key(&mut self, code: KeyCode) -> Result<(), DriverError> {
        self.send_key(code, true)?;
        self.send_key(code, false)
    }

    /// Liveness check; `Ok(false)` means the link is gone
    fn poll(&mut self) -> Result<bool, DriverError>;
}

/// Opens driver connections for a device address
///
/// The factory is the seam through which a concrete protocol implementation
/// (or a scripted test driver) is injected into the session layer.
pub trait DriverFactory: Send + Sync {
    /// Open a new, not-yet-connected driver for `address`
    fn open(&self, address: &str) -> Result<Box<dyn RemoteDriver>, DriverError>;
}
