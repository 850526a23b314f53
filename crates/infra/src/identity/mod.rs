//! Credential providers
//!
//! - [`GoogleOAuthProvider`]: installed-app OAuth with refresh tokens and an
//!   interactive PKCE fallback
//! - [`StaticCredentialProvider`]: a single pre-issued access token

pub mod callback;
pub mod google;
pub mod pkce;
pub mod static_token;

use std::sync::Arc;

use classbatch_core::CredentialProvider;
use classbatch_domain::{ClassBatchError, HostConfig, Result};
use tracing::info;

pub use google::{browser_notifier, AuthorizationNotifier, GoogleOAuthProvider, GoogleOAuthSettings};
pub use pkce::PkceChallenge;
pub use static_token::StaticCredentialProvider;

use crate::http::HttpClient;

/// Pick the credential provider the configuration asks for.
///
/// A `client_id` selects OAuth (seeded with any configured tokens); a bare
/// `access_token` selects the static provider.
///
/// # Errors
/// `Config` when neither is configured.
pub fn provider_from_config(
    config: &HostConfig,
    http: HttpClient,
) -> Result<Arc<dyn CredentialProvider>> {
    let has_client_id = config.auth.client_id.as_deref().is_some_and(|id| !id.trim().is_empty());

    if has_client_id {
        info!("Using OAuth credential provider");
        return Ok(Arc::new(GoogleOAuthProvider::from_config(&config.api, &config.auth, http)?));
    }

    match config.auth.access_token.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(token) => {
            info!("Using static access token");
            Ok(Arc::new(StaticCredentialProvider::new(token)))
        }
        None => Err(ClassBatchError::Config(
            "set auth.client_id or auth.access_token to authorize API calls".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use classbatch_domain::AuthConfig;

    use super::*;

    #[tokio::test]
    async fn access_token_alone_selects_static_provider() {
        let config = HostConfig {
            auth: AuthConfig { access_token: Some("ya29.x".into()), ..AuthConfig::default() },
            ..HostConfig::default()
        };

        let provider = provider_from_config(&config, HttpClient::new().unwrap()).unwrap();
        assert_eq!(provider.acquire(false).await.unwrap().secret(), "ya29.x");
    }

    #[test]
    fn missing_credentials_is_a_config_error() {
        let err = provider_from_config(&HostConfig::default(), HttpClient::new().unwrap()).err();
        assert!(matches!(err, Some(ClassBatchError::Config(_))));
    }
}
