//! Error types for settop-store

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while loading or saving device configuration
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("failed to access device store: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not contain valid device configuration
    #[error("device store is corrupted: {0}")]
    Format(#[from] serde_json::Error),

    /// The platform has no configuration directory to place the store in
    #[error("no platform configuration directory available")]
    NoConfigDir,
}
