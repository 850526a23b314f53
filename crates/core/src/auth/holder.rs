//! Shared credential slot
//!
//! Every remote call reads the current credential from one
//! [`CredentialHolder`]. Mutation goes through an async mutex, and
//! [`CredentialHolder::refresh`] is single-flight: when several calls hit a
//! 401 with the same stale credential, only the first one goes back to the
//! provider and the others pick up its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use classbatch_domain::{Credential, Result};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::ports::CredentialProvider;

/// Owns the provider and the current credential
pub struct CredentialHolder {
    provider: Arc<dyn CredentialProvider>,
    current: Mutex<Option<Credential>>,
    refreshes: AtomicU64,
}

impl CredentialHolder {
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self { provider, current: Mutex::new(None), refreshes: AtomicU64::new(0) }
    }

    /// Current credential, acquired interactively when absent.
    ///
    /// # Errors
    /// `Auth` when the provider cannot produce a credential.
    pub async fn get(&self) -> Result<Credential> {
        let mut slot = self.current.lock().await;
        if let Some(credential) = slot.as_ref() {
            return Ok(credential.clone());
        }
        debug!("No credential held, acquiring");
        let credential = self.provider.acquire(true).await?;
        *slot = Some(credential.clone());
        Ok(credential)
    }

    /// Explicit acquisition; replaces the current credential.
    ///
    /// # Errors
    /// `Auth` when the provider cannot produce a credential.
    pub async fn acquire(&self, interactive: bool) -> Result<Credential> {
        let mut slot = self.current.lock().await;
        let credential = self.provider.acquire(interactive).await?;
        *slot = Some(credential.clone());
        Ok(credential)
    }

    /// Replace `stale` with a fresh credential.
    ///
    /// Returns the current credential untouched if it already differs from
    /// `stale`.
    ///
    /// # Errors
    /// `Auth` when the provider cannot produce a credential. The slot is left
    /// empty in that case.
    pub async fn refresh(&self, stale: &Credential) -> Result<Credential> {
        let mut slot = self.current.lock().await;
        if let Some(current) = slot.as_ref().filter(|current| *current != stale) {
            debug!("Credential already refreshed by another call");
            return Ok(current.clone());
        }

        *slot = None;
        self.provider.invalidate(stale).await;
        let fresh = self.provider.acquire(true).await?;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        info!(refreshes = self.refresh_count(), "Credential refreshed");
        *slot = Some(fresh.clone());
        Ok(fresh)
    }

    /// Invalidate `credential` at the provider and drop it if current.
    pub async fn invalidate(&self, credential: &Credential) {
        let mut slot = self.current.lock().await;
        self.provider.invalidate(credential).await;
        if slot.as_ref() == Some(credential) {
            *slot = None;
        }
    }

    /// Completed provider refreshes since startup
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Current credential without acquiring
    pub async fn peek(&self) -> Option<Credential> {
        self.current.lock().await.clone()
    }
}
