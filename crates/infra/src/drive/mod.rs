//! Google Drive REST client

pub mod client;

pub use client::GoogleDriveClient;
