//! # ClassBatch Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP transport and the authorized remote call executor
//! - Google Classroom and Drive clients
//! - Credential providers (OAuth installed-app flow, static token)
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `classbatch-core`
//! - Contains all I/O (network, filesystem, environment)

pub mod api;
pub mod classroom;
pub mod config;
pub mod drive;
pub mod errors;
pub mod http;
pub mod identity;

// Re-export commonly used items
pub use api::ApiExecutor;
pub use classroom::GoogleClassroomClient;
pub use drive::GoogleDriveClient;
pub use errors::InfraError;
pub use http::HttpClient;
pub use identity::{GoogleOAuthProvider, StaticCredentialProvider};
