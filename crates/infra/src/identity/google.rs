//! Google OAuth 2.0 installed-app credential provider
//!
//! Credentials come from, in order:
//! 1. the cached access token while it is comfortably unexpired
//! 2. a refresh-token grant against the token endpoint
//! 3. an interactive authorization-code flow with PKCE and a loopback
//!    redirect (only when the caller allows interaction)

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classbatch_core::CredentialProvider;
use classbatch_domain::constants::TOKEN_EXPIRY_SKEW_SECS;
use classbatch_domain::{ApiConfig, AuthConfig, ClassBatchError, Credential, Result};
use parking_lot::Mutex;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::callback::CallbackServer;
use super::pkce::PkceChallenge;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Receives the consent URL the user has to open.
pub type AuthorizationNotifier = Arc<dyn Fn(&str) + Send + Sync>;

/// Static OAuth client settings
#[derive(Debug, Clone)]
pub struct GoogleOAuthSettings {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub login_timeout: Duration,
}

impl GoogleOAuthSettings {
    /// # Errors
    /// `Config` when no `client_id` is configured.
    pub fn from_config(api: &ApiConfig, auth: &AuthConfig) -> Result<Self> {
        let client_id = auth
            .client_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ClassBatchError::Config("auth.client_id is required for OAuth".into()))?;

        Ok(Self {
            client_id,
            client_secret: auth.client_secret.clone(),
            scopes: auth.scopes.clone(),
            authorization_endpoint: api.authorization_endpoint.clone(),
            token_endpoint: api.token_endpoint.clone(),
            login_timeout: Duration::from_secs(auth.login_timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    credential: Credential,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map_or(true, |at| now + chrono::Duration::seconds(TOKEN_EXPIRY_SKEW_SECS) < at)
    }
}

#[derive(Default)]
struct TokenState {
    access: Option<CachedToken>,
    refresh_token: Option<String>,
}

/// `CredentialProvider` backed by Google's OAuth endpoints
pub struct GoogleOAuthProvider {
    settings: GoogleOAuthSettings,
    http: HttpClient,
    state: Mutex<TokenState>,
    notifier: AuthorizationNotifier,
}

impl GoogleOAuthProvider {
    pub fn new(settings: GoogleOAuthSettings, http: HttpClient) -> Self {
        Self {
            settings,
            http,
            state: Mutex::new(TokenState::default()),
            notifier: browser_notifier(None),
        }
    }

    /// Provider seeded with whatever tokens the configuration carries.
    pub fn from_config(api: &ApiConfig, auth: &AuthConfig, http: HttpClient) -> Result<Self> {
        let provider = Self::new(GoogleOAuthSettings::from_config(api, auth)?, http)
            .with_notifier(browser_notifier(auth.browser_command.clone()));
        if let Some(refresh_token) = auth.refresh_token.clone() {
            provider.state.lock().refresh_token = Some(refresh_token);
        }
        if let Some(access_token) = auth.access_token.clone() {
            provider.state.lock().access =
                Some(CachedToken { credential: Credential::new(access_token), expires_at: None });
        }
        Ok(provider)
    }

    pub fn with_notifier(mut self, notifier: AuthorizationNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_refresh_token(self, refresh_token: impl Into<String>) -> Self {
        self.state.lock().refresh_token = Some(refresh_token.into());
        self
    }

    /// Current refresh token, if the provider holds one.
    pub fn refresh_token(&self) -> Option<String> {
        self.state.lock().refresh_token.clone()
    }

    fn cached(&self) -> Option<Credential> {
        let state = self.state.lock();
        state
            .access
            .as_ref()
            .filter(|token| token.is_fresh(Utc::now()))
            .map(|token| token.credential.clone())
    }

    fn store(&self, tokens: TokenResponse) -> Credential {
        let credential = Credential::new(tokens.access_token);
        let expires_at = tokens.expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        let mut state = self.state.lock();
        state.access = Some(CachedToken { credential: credential.clone(), expires_at });
        if let Some(refresh_token) = tokens.refresh_token {
            state.refresh_token = Some(refresh_token);
        }
        credential
    }

    /// Build the consent URL for one authorization attempt.
    pub fn authorization_url(&self, challenge: &PkceChallenge, redirect_uri: &str) -> String {
        let scope = self.settings.scopes.join(" ");
        let params = [
            ("response_type", "code"),
            ("client_id", self.settings.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", challenge.state.as_str()),
            ("code_challenge", challenge.code_challenge.as_str()),
            ("code_challenge_method", challenge.method()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.settings.authorization_endpoint)
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("client_id", &self.settings.client_id));
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret));
        }

        let response = self
            .http
            .send(self.http.request(Method::POST, &self.settings.token_endpoint).form(&form))
            .await?;
        let status = response.status();

        if status.is_success() {
            return response.json::<TokenResponse>().await.map_err(|err| {
                ClassBatchError::InvalidResponse(format!("malformed token response: {err}"))
            });
        }

        let body = response.text().await.map_err(|e| ClassBatchError::from(InfraError::from(e)))?;
        match serde_json::from_str::<TokenErrorBody>(&body) {
            Ok(error) => {
                let detail = error.error_description.unwrap_or_default();
                Err(ClassBatchError::Auth(format!("token endpoint rejected request: {} {detail}", error.error)
                    .trim_end()
                    .to_string()))
            }
            Err(_) => Err(ClassBatchError::Auth(format!(
                "token endpoint returned {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ))),
        }
    }

    async fn refresh_silently(&self) -> Result<Credential> {
        let refresh_token = self
            .refresh_token()
            .ok_or_else(|| ClassBatchError::Auth("not signed in".into()))?;

        match self
            .token_request(&[("grant_type", "refresh_token"), ("refresh_token", &refresh_token)])
            .await
        {
            Ok(tokens) => {
                debug!("Access token refreshed");
                Ok(self.store(tokens))
            }
            Err(err) => {
                if err.to_string().contains("invalid_grant") {
                    warn!("Refresh token revoked; discarding it");
                    self.state.lock().refresh_token = None;
                }
                Err(err)
            }
        }
    }

    async fn interactive_login(&self) -> Result<Credential> {
        let challenge = PkceChallenge::generate();
        let mut server = CallbackServer::start(challenge.state.clone()).await?;
        let redirect_uri = server.redirect_uri();

        (self.notifier)(&self.authorization_url(&challenge, &redirect_uri));
        let code = server.wait_for_code(self.settings.login_timeout).await;
        server.shutdown().await;
        let code = code?;

        let tokens = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", &code),
                ("code_verifier", &challenge.code_verifier),
                ("redirect_uri", &redirect_uri),
            ])
            .await?;
        info!("Interactive sign-in completed");
        Ok(self.store(tokens))
    }
}

#[async_trait]
impl CredentialProvider for GoogleOAuthProvider {
    #[instrument(skip(self))]
    async fn acquire(&self, interactive: bool) -> Result<Credential> {
        if let Some(credential) = self.cached() {
            return Ok(credential);
        }

        match self.refresh_silently().await {
            Ok(credential) => return Ok(credential),
            Err(err) if !interactive => return Err(err),
            Err(err) => debug!(error = %err, "Silent refresh unavailable; starting interactive sign-in"),
        }

        self.interactive_login().await
    }

    async fn invalidate(&self, credential: &Credential) {
        let mut state = self.state.lock();
        if state.access.as_ref().is_some_and(|token| token.credential == *credential) {
            state.access = None;
        }
    }
}

/// Log the consent URL and, when configured, hand it to a browser command.
///
/// stdout belongs to the native-messaging channel so the child never
/// inherits it.
pub fn browser_notifier(browser_command: Option<String>) -> AuthorizationNotifier {
    Arc::new(move |url: &str| {
        info!(%url, "Open this URL to authorize ClassBatch");
        let Some(program) = browser_command.as_deref() else {
            return;
        };
        let spawned = std::process::Command::new(program)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(err) = spawned {
            warn!(program, error = %err, "Could not launch browser");
        }
    })
}
