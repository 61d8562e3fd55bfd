//! Error types for filevault
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using VaultError
pub type Result<T> = std::result::Result<T, VaultError>;

/// Unified error type for filevault operations
#[derive(Debug, Error)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Local File Errors
    // -------------------------------------------------------------------------
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Value {value} does not fit in a {width}-byte field")]
    FieldOverflow { value: u64, width: usize },

    #[error("Filename is {0} bytes long (max 65535)")]
    FilenameTooLong(usize),

    #[error("Payload is {0} bytes long (max 4294967295)")]
    PayloadTooLarge(u64),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Transfer truncated: received {received} of {declared} declared bytes")]
    TruncatedTransfer { declared: u32, received: u64 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// True when the peer closed the stream before a fixed-size field was complete
    pub fn is_eof(&self) -> bool {
        matches!(self, VaultError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}
