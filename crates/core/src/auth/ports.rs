//! Port interface for credential providers

use async_trait::async_trait;
use classbatch_domain::{Credential, Result};

/// Source of bearer credentials
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Obtain a credential.
    ///
    /// With `interactive` set the provider may involve the user (consent
    /// page); otherwise it must answer from what it already holds.
    ///
    /// # Errors
    /// `ClassBatchError::Auth` when no credential can be produced.
    async fn acquire(&self, interactive: bool) -> Result<Credential>;

    /// Forget `credential` so that the next `acquire` does not return it.
    async fn invalidate(&self, credential: &Credential);
}
