//! Classroom and Drive operations

pub mod ports;

pub use ports::{ClassroomGateway, FileStorage};
