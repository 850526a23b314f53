//! Google Classroom REST client

pub mod client;

pub use client::GoogleClassroomClient;
