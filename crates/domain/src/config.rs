//! Configuration structures
//!
//! Every field has a default so that a partial file (or no file at all plus
//! a couple of environment overrides) yields a usable configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CLASSROOM_API_BASE_URL, CLASSROOM_WEB_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_INTER_CALL_DELAY_MS, DEFAULT_LOGIN_TIMEOUT_SECS, DEFAULT_MAX_COURSE_PAGES,
    DEFAULT_SCOPES, DEFAULT_USER_AGENT, DRIVE_API_BASE_URL, DRIVE_UPLOAD_BASE_URL,
    DRIVE_WEB_BASE_URL, GOOGLE_AUTHORIZATION_ENDPOINT, GOOGLE_TOKEN_ENDPOINT,
};
use crate::impl_keyword_conversions;

/// Top-level host configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub batch: BatchConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Remote endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub classroom_base_url: String,
    pub drive_base_url: String,
    pub drive_upload_base_url: String,
    pub classroom_web_base_url: String,
    pub drive_web_base_url: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            classroom_base_url: CLASSROOM_API_BASE_URL.to_string(),
            drive_base_url: DRIVE_API_BASE_URL.to_string(),
            drive_upload_base_url: DRIVE_UPLOAD_BASE_URL.to_string(),
            classroom_web_base_url: CLASSROOM_WEB_BASE_URL.to_string(),
            drive_web_base_url: DRIVE_WEB_BASE_URL.to_string(),
            authorization_endpoint: GOOGLE_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
        }
    }
}

/// Credential sources
///
/// Either `client_id` (OAuth installed-app flow) or `access_token` (a
/// pre-issued token) must be set.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub login_timeout_secs: u64,
    /// Program used to open the consent page, called with the URL as its
    /// only argument. When unset the URL is only logged.
    pub browser_command: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            refresh_token: None,
            access_token: None,
            login_timeout_secs: DEFAULT_LOGIN_TIMEOUT_SECS,
            browser_command: None,
        }
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("scopes", &self.scopes)
            .field("refresh_token", &redact(&self.refresh_token))
            .field("access_token", &redact(&self.access_token))
            .field("login_timeout_secs", &self.login_timeout_secs)
            .field("browser_command", &self.browser_command)
            .finish()
    }
}

/// Which resource a material batch posts to each classroom
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialPostKind {
    /// Stream announcement with attachments
    #[default]
    Announcement,
    /// Classwork "material" item
    Material,
}

impl_keyword_conversions!(MaterialPostKind {
    Announcement => "announcement",
    Material => "material",
});

/// Batch orchestration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Pause before every target after the first one.
    pub inter_call_delay_ms: u64,
    pub material_post: MaterialPostKind,
    pub max_course_pages: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_call_delay_ms: DEFAULT_INTER_CALL_DELAY_MS,
            material_post: MaterialPostKind::default(),
            max_course_pages: DEFAULT_MAX_COURSE_PAGES,
        }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Proxy for every request; unset means the `HTTPS_PROXY`/`HTTP_PROXY`
    /// environment is honored.
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl_keyword_conversions!(LogFormat {
    Text => "text",
    Json => "json",
});

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::default() }
    }
}
