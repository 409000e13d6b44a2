//! Unified error handling for lm90mon
//!
//! This crate provides the error types shared by the LM90 monitoring core.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using Lm90Error
pub type Result<T> = std::result::Result<T, Lm90Error>;

/// Transport failure on a single register access
///
/// Reported by the bus shim and propagated unchanged. This layer never retries.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("Failed to read register {register:#04x} at address {address:#04x}: {reason}")]
    Read {
        address: u8,
        register: u8,
        reason: String,
    },

    #[error("Failed to write {value:#04x} to register {register:#04x} at address {address:#04x}: {reason}")]
    Write {
        address: u8,
        register: u8,
        value: u8,
        reason: String,
    },
}

impl BusError {
    /// Create a read failure
    pub fn read(address: u8, register: u8, reason: impl Into<String>) -> Self {
        Self::Read {
            address,
            register,
            reason: reason.into(),
        }
    }

    /// Create a write failure
    pub fn write(address: u8, register: u8, value: u8, reason: impl Into<String>) -> Self {
        Self::Write {
            address,
            register,
            value,
            reason: reason.into(),
        }
    }

    /// Register the failed transfer was aimed at
    pub fn register(&self) -> u8 {
        match self {
            Self::Read { register, .. } | Self::Write { register, .. } => *register,
        }
    }
}

/// Why an address was excluded while probing
///
/// Both variants are expected outcomes when scanning a bus and are not failures of the system.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("No supported chip at address {address:#04x}")]
    Unsupported { address: u8 },

    #[error("Bus does not support byte data transfers, skipping address {address:#04x}")]
    BusUnavailable { address: u8 },
}

impl ProbeError {
    pub fn address(&self) -> u8 {
        match self {
            Self::Unsupported { address } | Self::BusUnavailable { address } => *address,
        }
    }
}

/// Unified error type for all lm90mon operations
#[derive(thiserror::Error, Debug)]
pub enum Lm90Error {
    // ============================================================================
    // Hardware Access Errors
    // ============================================================================
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Failed to initialize chip at address {address:#04x}: {source}")]
    Init {
        address: u8,
        #[source]
        source: BusError,
    },

    // ============================================================================
    // Registry Errors
    // ============================================================================
    #[error("A device is already attached at address {0:#04x}")]
    AddressInUse(u8),

    #[error("No device attached at address {0:#04x}")]
    DeviceNotFound(u8),

    // ============================================================================
    // Channel Errors
    // ============================================================================
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Channel {0} is read-only")]
    ReadOnlyChannel(&'static str),

    #[error("Invalid values for channel {channel}: {reason}")]
    InvalidChannelValues {
        channel: &'static str,
        reason: String,
    },

    #[error("Invalid channel value {text:?}: {reason}")]
    InvalidValue { text: String, reason: &'static str },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write configuration {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Lm90Error {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid channel values error
    pub fn invalid_values(channel: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidChannelValues {
            channel,
            reason: reason.into(),
        }
    }

    /// Create an error for channel value text that cannot be parsed
    pub fn invalid_value(text: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidValue {
            text: text.into(),
            reason,
        }
    }

    /// True when the error came from the transport, either directly or during initialization
    pub fn is_bus_error(&self) -> bool {
        matches!(self, Self::Bus(_) | Self::Init { .. })
    }

    /// True for probe outcomes that simply mean "nothing supported here"
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Probe(ProbeError::Unsupported { .. }))
    }
}
