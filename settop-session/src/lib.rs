//! Per-device session orchestration
//!
//! The heart of settop-sdk: for every set-top box a caller talks to, this
//! crate owns a connection lifecycle state machine, a queue of pending key
//! events, a retry/heartbeat policy, and a broadcast channel to state
//! observers.
//!
//! # Architecture
//!
//! ```text
//! dispatch / subscribe → SessionRegistry → Session ─┬─ EventQueue
//!                                                   ├─ SubscriberSet
//!                                                   └─ Worker thread → RemoteDriver
//! ```
//!
//! Callers never block on device I/O: `dispatch` and `register_subscriber`
//! take short locks, make sure a background worker is running, and return.
//! The worker drains the queue in batches, drives the driver, and reports
//! every state transition back through the session to its subscribers.
//! Failures never surface to callers: they are absorbed at the worker
//! boundary and become `Disconnected`/`Failed` broadcasts instead.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use settop_session::{Command, SessionRegistry, subscriber_fn};
//! use settop_driver::KeyCode;
//! use settop_store::DeviceId;
//!
//! let registry = SessionRegistry::new(store, drivers);
//! let id = DeviceId::new("living-room");
//!
//! registry.register_subscriber(&id, subscriber_fn(|id, state| {
//!     println!("{id}: {state}");
//! }));
//! registry.dispatch(&id, Command::KeyPress(KeyCode::CHANNEL_UP));
//! ```
//!
//! # Lifecycle
//!
//! A session's worker walks `Connecting → Connected → Disconnected`, with
//! `Failed` (then `Disconnected`) when the connect retry budget runs out.
//! `Disconnected` is not the end of the session object: the next dispatch or
//! subscription starts a fresh worker generation. Workers are cooperatively
//! cancelled and generation-fenced, so a worker replaced by a forced
//! reconnect can never corrupt the session that outlived it.

pub mod command;
pub mod config;
pub mod logging;
pub mod queue;
pub mod registry;
pub mod session;
pub mod subscriber;

mod worker;

pub use command::{Command, KeyAction, KeyEvent};
pub use config::SessionConfig;
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use queue::EventQueue;
pub use registry::SessionRegistry;
pub use session::Session;
pub use subscriber::{subscriber_fn, StateSubscriber, SubscriberGone, SubscriberSet};

// Re-export the collaborator contracts the public API is expressed in
pub use settop_driver::{ConnectionState, DriverFactory, KeyCode, RemoteDriver};
pub use settop_store::{DeviceId, DeviceInfo, DeviceStore};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::command::{Command, KeyAction, KeyEvent};
    pub use crate::config::SessionConfig;
    pub use crate::registry::SessionRegistry;
    pub use crate::session::Session;
    pub use crate::subscriber::{subscriber_fn, StateSubscriber, SubscriberGone};
    pub use settop_driver::{ConnectionState, DriverFactory, KeyCode, RemoteDriver};
    pub use settop_store::{DeviceId, DeviceInfo, DeviceStore};
}
