//! Error types for the output pipeline
use std::io;

use thiserror::Error;

/// Output pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or inconsistent configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Device variant name that no sink implements
    #[error("unknown device variant: {0}")]
    UnknownDevice(String),

    /// Strip cannot be addressed by the one-byte index of the UDP protocol
    #[error("strip of {len} pixels exceeds the {max} pixel protocol limit")]
    StripTooLong { len: usize, max: usize },

    /// Channel value outside 0..=255
    #[error("value {value} is outside 0..=255")]
    OutOfRange { value: i64 },

    /// I/O failure on a single frame
    #[error("send failed: {0}")]
    TransientSend(#[source] io::Error),

    /// Device stopped answering, the sink is disabled for the process lifetime
    #[error("device unreachable: {0}")]
    DeviceUnreachable(String),

    /// I/O error while loading a resource
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed TOML configuration
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Returns true if the failing sink must not be driven again
    pub const fn disables_sink(&self) -> bool {
        matches!(self, Self::DeviceUnreachable(_))
    }
}

/// Result type for output operations
pub type Result<T> = std::result::Result<T, Error>;
