//! # NimbusKV Client
//!
//! A synchronous TCP client for the NimbusKV distributed key-value store:
//! - Fixed 10-byte-header binary protocol (pure codec, no I/O)
//! - One persistent connection, one outstanding request at a time
//! - Wrapping request-id correlation with byte-exact key echo checks
//! - Record-oriented benchmark adapter and multi-threaded load harness
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Harness (adapter / workload)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Client                                 │
//! │        (request ids, blocking reads, validation)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Codec                             │
//! │           (fixed 10-byte header + payload)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                TCP (blocking, no timeouts)
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  NimbusKV Gateway                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod client;
pub mod harness;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClientError, Result};
pub use config::ClientConfig;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the NimbusKV client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
