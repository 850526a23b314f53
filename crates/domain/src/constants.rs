//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Remote endpoints
pub const CLASSROOM_API_BASE_URL: &str = "https://classroom.googleapis.com/v1";
pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";
pub const CLASSROOM_WEB_BASE_URL: &str = "https://classroom.google.com";
pub const DRIVE_WEB_BASE_URL: &str = "https://drive.google.com";
pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

// OAuth scopes requested by the host
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/classroom.courses.readonly",
    "https://www.googleapis.com/auth/classroom.coursework.students",
    "https://www.googleapis.com/auth/classroom.announcements",
    "https://www.googleapis.com/auth/classroom.courseworkmaterials",
    "https://www.googleapis.com/auth/drive.file",
];

// Batch behaviour
pub const DEFAULT_INTER_CALL_DELAY_MS: u64 = 500;
pub const COURSE_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_COURSE_PAGES: u32 = 10;

// Text used when the caller leaves a post empty
pub const DEFAULT_ANNOUNCEMENT_TEXT: &str = "New materials have been added to the class.";
pub const DEFAULT_MATERIAL_TITLE: &str = "New materials";

// Auth
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 180;

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("classbatch/", env!("CARGO_PKG_VERSION"));

// Native messaging limits (bytes)
pub const MAX_OUTGOING_MESSAGE_BYTES: usize = 1024 * 1024;
pub const MAX_INCOMING_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

// Liveness probe
pub const API_INTEGRATION_MODE: &str = "REAL_API_MODE";
