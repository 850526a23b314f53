//! Credential acquisition and the shared credential slot

pub mod holder;
pub mod ports;

pub use holder::CredentialHolder;
pub use ports::CredentialProvider;
