//! Session timing configuration

use std::time::Duration;

/// Timing knobs for session workers
///
/// The defaults match the cadence the boxes tolerate in practice; tests dial
/// everything down to milliseconds.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Connect retries after the initial attempt
    pub retry_count: u32,
    /// Fixed sleep between connect attempts
    pub retry_backoff: Duration,
    /// How often a connected worker polls the device for liveness
    pub poll_interval: Duration,
    /// Idle period after which an unobserved session shuts itself down
    pub inactivity_timeout: Duration,
    /// How long a forced restart waits for the old worker before abandoning it
    pub restart_join_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_backoff: Duration::from_millis(500),
            poll_interval: Duration::from_secs(5),
            inactivity_timeout: Duration::from_secs(30),
            restart_join_timeout: Duration::from_millis(500),
        }
    }
}
