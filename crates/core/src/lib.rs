//! # ClassBatch Core
//!
//! Business logic layer - no network or filesystem access.
//!
//! This crate contains:
//! - Port interfaces (traits) for credentials, Classroom and Drive
//! - The credential holder shared by every remote call
//! - The batch orchestrator
//!
//! ## Architecture Principles
//! - Only depends on `classbatch-domain`
//! - All external access via traits, implemented in `classbatch-infra`
//! - Timers are the only side effect

pub mod auth;
pub mod batch;
pub mod classroom;
pub mod links;

pub use auth::{CredentialHolder, CredentialProvider};
pub use batch::BatchService;
pub use classroom::{ClassroomGateway, FileStorage};
pub use links::Links;
