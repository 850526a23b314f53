//! Command handlers - one per extension action

mod auth;
mod batch;
mod courses;
mod health;

pub use auth::*;
pub use batch::*;
pub use courses::*;
pub use health::*;
