//! Authorized remote calls
//!
//! Every Classroom and Drive request goes through [`ApiExecutor`], which
//! attaches the current bearer credential and retries exactly once after a
//! 401 with a refreshed one.

pub mod executor;

pub use executor::ApiExecutor;
