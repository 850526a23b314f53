//! Liveness probe

use chrono::{SecondsFormat, Utc};
use classbatch_domain::constants::API_INTEGRATION_MODE;

use crate::protocol::ConnectionReply;

pub const CONNECTION_MESSAGE: &str = "Background script is working";

/// Answered synchronously, without touching the network.
///
/// # Example Response
/// ```json
/// {
///   "success": true,
///   "message": "Background script is working",
///   "timestamp": "2025-03-01T12:00:00.000Z",
///   "apiIntegration": "REAL_API_MODE",
///   "version": "0.1.0"
/// }
/// ```
pub fn test_connection() -> ConnectionReply {
    ConnectionReply {
        message: CONNECTION_MESSAGE.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        api_integration: API_INTEGRATION_MODE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
