//! Device driver contract for settop-sdk
//!
//! Defines the boundary between the session orchestration layer and the
//! native wire protocol that actually talks to a set-top box. The session
//! layer only ever sees the [`RemoteDriver`] and [`DriverFactory`] traits;
//! a concrete driver crate (or a scripted stand-in, see [`testing`]) plugs
//! in behind them.
//!
//! Also home to the shared [`ConnectionState`] lifecycle enum and the
//! [`KeyCode`] table of the handset's native key domain.

pub mod driver;
pub mod keys;
pub mod state;

#[cfg(feature = "test-support")]
pub mod testing;

pub use driver::{DriverError, DriverFactory, RemoteDriver, DEFAULT_PORT};
pub use keys::KeyCode;
pub use state::ConnectionState;
