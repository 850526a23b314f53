//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read the explicit path, or the first probed file that exists
//! 2. Fall back to defaults when no file is found
//! 3. Apply `CLASSBATCH_*` environment overrides
//! 4. Validate
//!
//! ## Environment Variables
//! - `CLASSBATCH_CLIENT_ID`, `CLASSBATCH_CLIENT_SECRET`: OAuth client
//! - `CLASSBATCH_REFRESH_TOKEN`: stored refresh token
//! - `CLASSBATCH_ACCESS_TOKEN`: pre-issued access token
//! - `CLASSBATCH_SCOPES`: space or comma separated scope list
//! - `CLASSBATCH_BROWSER`: program that opens the consent URL
//! - `CLASSBATCH_LOGIN_TIMEOUT_SECS`
//! - `CLASSBATCH_INTER_CALL_DELAY_MS`
//! - `CLASSBATCH_MATERIAL_POST`: `announcement` or `material`
//! - `CLASSBATCH_MAX_COURSE_PAGES`
//! - `CLASSBATCH_HTTP_TIMEOUT_SECS`
//! - `CLASSBATCH_LOG_LEVEL`, `CLASSBATCH_LOG_FORMAT`
//! - `CLASSBATCH_CLASSROOM_BASE_URL`, `CLASSBATCH_DRIVE_BASE_URL`,
//!   `CLASSBATCH_DRIVE_UPLOAD_BASE_URL`, `CLASSBATCH_AUTHORIZATION_ENDPOINT`,
//!   `CLASSBATCH_TOKEN_ENDPOINT`
//!
//! ## File Locations
//! 1. `./classbatch.toml` or `./classbatch.json`
//! 2. `$XDG_CONFIG_HOME/classbatch/config.{toml,json}` (or `~/.config`)
//! 3. `classbatch.{toml,json}` next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use classbatch_domain::{ClassBatchError, HostConfig, Result};
use tracing::{debug, info};

/// Load, override and validate the host configuration.
///
/// # Errors
/// `Config` when an explicit file is missing, any file or override is
/// malformed, or the result fails [`validate`].
pub fn load(path: Option<PathBuf>) -> Result<HostConfig> {
    let mut config = match path.or_else(probe_config_paths) {
        Some(path) => load_from_file(&path)?,
        None => {
            info!("No config file found; using defaults");
            HostConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Read one configuration file.
///
/// # Errors
/// `Config` when the file cannot be read or parsed.
pub fn load_from_file(path: &Path) -> Result<HostConfig> {
    if !path.exists() {
        return Err(ClassBatchError::Config(format!("Config file not found: {}", path.display())));
    }

    info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ClassBatchError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Format is chosen by extension; anything but `.toml` is read as JSON.
fn parse_config(contents: &str, path: &Path) -> Result<HostConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ClassBatchError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ClassBatchError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ClassBatchError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("classbatch.toml"));
        candidates.push(cwd.join("classbatch.json"));
    }

    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));
    if let Some(dir) = config_home {
        candidates.push(dir.join("classbatch").join("config.toml"));
        candidates.push(dir.join("classbatch").join("config.json"));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join("classbatch.toml"));
            candidates.push(exe_dir.join("classbatch.json"));
        }
    }

    let found = candidates.into_iter().find(|path| path.exists());
    debug!(path = ?found, "Probed configuration paths");
    found
}

/// Overlay `CLASSBATCH_*` environment variables onto `config`.
///
/// # Errors
/// `Config` when a numeric or keyword variable does not parse.
pub fn apply_env_overrides(config: &mut HostConfig) -> Result<()> {
    let auth = &mut config.auth;
    set_string(&mut auth.client_id, "CLASSBATCH_CLIENT_ID");
    set_string(&mut auth.client_secret, "CLASSBATCH_CLIENT_SECRET");
    set_string(&mut auth.refresh_token, "CLASSBATCH_REFRESH_TOKEN");
    set_string(&mut auth.access_token, "CLASSBATCH_ACCESS_TOKEN");
    set_string(&mut auth.browser_command, "CLASSBATCH_BROWSER");
    if let Some(scopes) = env_var("CLASSBATCH_SCOPES") {
        auth.scopes = scopes
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    set_parsed(&mut auth.login_timeout_secs, "CLASSBATCH_LOGIN_TIMEOUT_SECS")?;

    set_parsed(&mut config.batch.inter_call_delay_ms, "CLASSBATCH_INTER_CALL_DELAY_MS")?;
    set_parsed(&mut config.batch.material_post, "CLASSBATCH_MATERIAL_POST")?;
    set_parsed(&mut config.batch.max_course_pages, "CLASSBATCH_MAX_COURSE_PAGES")?;

    set_parsed(&mut config.http.timeout_secs, "CLASSBATCH_HTTP_TIMEOUT_SECS")?;
    set_string(&mut config.http.proxy, "CLASSBATCH_HTTP_PROXY");

    set_parsed(&mut config.logging.level, "CLASSBATCH_LOG_LEVEL")?;
    set_parsed(&mut config.logging.format, "CLASSBATCH_LOG_FORMAT")?;

    let api = &mut config.api;
    set_parsed(&mut api.classroom_base_url, "CLASSBATCH_CLASSROOM_BASE_URL")?;
    set_parsed(&mut api.drive_base_url, "CLASSBATCH_DRIVE_BASE_URL")?;
    set_parsed(&mut api.drive_upload_base_url, "CLASSBATCH_DRIVE_UPLOAD_BASE_URL")?;
    set_parsed(&mut api.authorization_endpoint, "CLASSBATCH_AUTHORIZATION_ENDPOINT")?;
    set_parsed(&mut api.token_endpoint, "CLASSBATCH_TOKEN_ENDPOINT")?;

    Ok(())
}

/// Reject configurations the host cannot run with.
///
/// # Errors
/// `Config` when no credential source is set, a base URL does not parse, or
/// the HTTP timeout is zero.
pub fn validate(config: &HostConfig) -> Result<()> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if !present(&config.auth.client_id) && !present(&config.auth.access_token) {
        return Err(ClassBatchError::Config(
            "auth.client_id or auth.access_token must be set".to_string(),
        ));
    }

    let api = &config.api;
    for (name, value) in [
        ("api.classroom_base_url", &api.classroom_base_url),
        ("api.drive_base_url", &api.drive_base_url),
        ("api.drive_upload_base_url", &api.drive_upload_base_url),
        ("api.classroom_web_base_url", &api.classroom_web_base_url),
        ("api.drive_web_base_url", &api.drive_web_base_url),
        ("api.authorization_endpoint", &api.authorization_endpoint),
        ("api.token_endpoint", &api.token_endpoint),
    ] {
        url::Url::parse(value)
            .map_err(|e| ClassBatchError::Config(format!("{name} is not a valid URL: {e}")))?;
    }

    if let Some(proxy) = &config.http.proxy {
        url::Url::parse(proxy)
            .map_err(|e| ClassBatchError::Config(format!("http.proxy is not a valid URL: {e}")))?;
    }

    if config.http.timeout_secs == 0 {
        return Err(ClassBatchError::Config("http.timeout_secs must be positive".to_string()));
    }

    Ok(())
}

/// Non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn set_string(target: &mut Option<String>, key: &str) {
    if let Some(value) = env_var(key) {
        *target = Some(value);
    }
}

fn set_parsed<T>(target: &mut T, key: &str) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = env_var(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| ClassBatchError::Config(format!("Invalid {key}: {e}")))?;
    }
    Ok(())
}
