use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use classbatch_core::CredentialProvider;
use classbatch_domain::{ClassBatchError, Credential, Result};
use tracing::warn;

/// Serves one pre-issued access token.
///
/// Once the remote side rejects it there is nothing to refresh, so every
/// later acquisition fails with `Auth`.
pub struct StaticCredentialProvider {
    credential: Credential,
    rejected: AtomicBool,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { credential: Credential::new(token), rejected: AtomicBool::new(false) }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn acquire(&self, _interactive: bool) -> Result<Credential> {
        if self.rejected.load(Ordering::Acquire) {
            return Err(ClassBatchError::Auth("configured access token was rejected".into()));
        }
        Ok(self.credential.clone())
    }

    async fn invalidate(&self, credential: &Credential) {
        if *credential == self.credential {
            warn!("Configured access token rejected by the API");
            self.rejected.store(true, Ordering::Release);
        }
    }
}
