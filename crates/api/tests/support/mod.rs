//! Shared fixtures for host integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use classbatch_core::CredentialProvider;
use classbatch_domain::{ClassBatchError, Credential, HostConfig, Result};
use classbatch_host::{AppContext, MessageRouter};
use wiremock::MockServer;

/// Scripted token list handed out in order; the last one repeats.
struct Tokens(Mutex<Vec<String>>);

impl Tokens {
    fn new(tokens: &[&str]) -> Self {
        Self(Mutex::new(tokens.iter().rev().map(|t| (*t).to_string()).collect()))
    }

    fn next(&self) -> String {
        let mut remaining = self.0.lock().unwrap();
        if remaining.len() > 1 {
            remaining.pop().unwrap()
        } else {
            remaining.last().cloned().unwrap_or_default()
        }
    }
}

/// Provider issuing `t1`, `t2`, ... and counting acquisitions
pub struct ScriptedProvider {
    tokens: Tokens,
    pub acquisitions: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(tokens: &[&str]) -> Arc<Self> {
        Arc::new(Self { tokens: Tokens::new(tokens), acquisitions: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl CredentialProvider for ScriptedProvider {
    async fn acquire(&self, _interactive: bool) -> Result<Credential> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Credential::new(self.tokens.next()))
    }

    async fn invalidate(&self, _credential: &Credential) {}
}

/// Provider that never yields a credential
pub struct RefusingProvider;

#[async_trait]
impl CredentialProvider for RefusingProvider {
    async fn acquire(&self, _interactive: bool) -> Result<Credential> {
        Err(ClassBatchError::Auth("user closed the consent window".into()))
    }

    async fn invalidate(&self, _credential: &Credential) {}
}

/// Configuration pointing every API at `server`, with no pacing.
pub fn config(server: &MockServer) -> HostConfig {
    let mut config = HostConfig::default();
    config.api.classroom_base_url = server.uri();
    config.api.drive_base_url = format!("{}/drive/v3", server.uri());
    config.api.drive_upload_base_url = format!("{}/upload/drive/v3", server.uri());
    config.batch.inter_call_delay_ms = 0;
    config
}

pub fn router_with(config: HostConfig, provider: Arc<dyn CredentialProvider>) -> MessageRouter {
    let context = AppContext::with_provider(config, provider).unwrap();
    MessageRouter::new(Arc::new(context))
}

pub fn router(server: &MockServer) -> MessageRouter {
    router_with(config(server), ScriptedProvider::new(&["t1"]))
}
