//! # ClassBatch Host
//!
//! Native-messaging application layer.
//!
//! This crate contains:
//! - The message contract and router (extension → backend bridge)
//! - Command handlers
//! - Application context (dependency injection)
//! - The native-messaging transport
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - The binary serves the router over stdin/stdout

pub mod commands;
pub mod context;
pub mod protocol;
pub mod router;
pub mod transport;
pub mod utils;

// Re-export for convenience
pub use context::AppContext;
pub use protocol::{Request, Response};
pub use router::{Action, Dispatch, MessageRouter};
pub use transport::serve;
