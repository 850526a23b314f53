//! Logging and command helpers

pub mod command_helpers;
pub mod logging;

pub use command_helpers::execute_command;
pub use logging::{error_label, init_logging, log_command_execution};
