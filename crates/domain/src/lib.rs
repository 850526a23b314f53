//! # ClassBatch Domain
//!
//! Business domain types and models for ClassBatch.
//!
//! This crate contains:
//! - Request and result types exchanged with the browser extension
//! - Google Classroom / Drive resource schemas
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other ClassBatch crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
