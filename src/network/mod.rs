//! Network Module
//!
//! TCP connection handling for the client.
//!
//! ## Architecture
//! - One connection per operation
//! - Blocking reads, no timeout unless configured
//! - Closed on drop, on every exit path

mod connection;

pub use connection::Connection;
