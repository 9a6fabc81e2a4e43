//! Error types for the NimbusKV client
//!
//! Provides a unified error type for all operations.
//!
//! Benign outcomes (key absent, server rejected a write) are NOT errors;
//! they travel in the `Ok` channel as `Ok(None)` / `Ok(false)`. The variants
//! here cover transport faults, framing violations and misuse of the
//! connection lifecycle, each distinguishable by the caller.

use thiserror::Error;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Unified error type for NimbusKV client operations
#[derive(Debug, Error)]
pub enum ClientError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed mid-message: expected {expected} bytes, received {received}")]
    UnexpectedEof { expected: usize, received: usize },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Response id mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: u32, actual: u32 },

    #[error("Response key mismatch: expected {expected:?}, got {actual:?}")]
    KeyMismatch { expected: Vec<u8>, actual: Vec<u8> },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server rejected registration")]
    HandshakeRejected,

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Key too large: {size} bytes (limit {limit})")]
    KeyTooLarge { size: usize, limit: usize },

    #[error("Value too large: {size} bytes (limit {limit})")]
    ValueTooLarge { size: usize, limit: usize },

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Client is not connected")]
    NotConnected,

    #[error("Client was disconnected and cannot be reused")]
    Disconnected,

    // -------------------------------------------------------------------------
    // Harness Errors
    // -------------------------------------------------------------------------
    #[error("Workload worker failed: {0}")]
    Worker(String),
}
