//! # filevault
//!
//! A backup client for a fixed-header, length-prefixed binary file storage
//! protocol, with:
//! - Save, retrieve, delete and list operations
//! - One request per TCP connection
//! - Chunked payload reception with explicit truncation reporting
//! - Context-sensitive response parsing keyed by (opcode, status)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      BackupClient                            │
//! │          (one operation = one connection, no retries)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Connection                               │
//! │              (scoped TCP stream, closed on drop)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │  Transfer   │
//!   │ (framing)   │          │  (chunks)   │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ Field Codec │
//!   │    (LE)     │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transfer;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{VaultError, Result};
pub use config::ClientConfig;
pub use client::{BackupClient, Outcome, Report};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of filevault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
