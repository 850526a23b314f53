//! Batch orchestration
//!
//! Runs one operation against many targets, one remote call at a time, and
//! reports an entry per target.

pub mod service;

pub use service::BatchService;
