//! Loopback HTTP server that receives the OAuth redirect

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use classbatch_domain::{ClassBatchError, Result};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, warn};

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Complete</title></head>
<body><h1>ClassBatch is authorized</h1><p>You can close this window.</p></body>
</html>"#;

const FAILURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Failed</title></head>
<body><h1>Authorization Failed</h1><p>Return to the extension and try again.</p></body>
</html>"#;

type Outcome = Result<String>;

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    sender: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

/// One-shot callback listener on `127.0.0.1:<ephemeral>`
pub struct CallbackServer {
    port: u16,
    receiver: oneshot::Receiver<Outcome>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind and start serving `/callback`.
    ///
    /// # Errors
    /// `Network` when the loopback port cannot be bound.
    pub async fn start(expected_state: impl Into<String>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.map_err(|err| {
            ClassBatchError::Network(format!("failed to bind OAuth loopback server: {err}"))
        })?;
        let port = listener
            .local_addr()
            .map_err(|err| ClassBatchError::Network(format!("failed to determine port: {err}")))?
            .port();

        let (sender, receiver) = oneshot::channel();
        let state = CallbackState {
            expected_state: Arc::from(expected_state.into()),
            sender: Arc::new(Mutex::new(Some(sender))),
        };
        let app = Router::new().route("/callback", get(handle_callback)).with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("OAuth callback server error: {}", err);
            }
        });

        Ok(Self { port, receiver, shutdown_tx: Some(shutdown_tx), handle: Some(handle) })
    }

    /// Redirect URI to register in the authorization request.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.port)
    }

    /// Wait for the authorization code.
    ///
    /// # Errors
    /// `Auth` when consent is denied or does not arrive within `timeout`.
    pub async fn wait_for_code(&mut self, timeout: Duration) -> Result<String> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(ClassBatchError::Internal("OAuth callback server stopped".into())),
            Err(_) => Err(ClassBatchError::Auth(format!(
                "no consent received within {}s",
                timeout.as_secs()
            ))),
        }
    }

    /// Stop serving.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "OAuth callback server task ended abnormally");
            }
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<&'static str> {
    if params.get("state").map(String::as_str) != Some(&*state.expected_state) {
        warn!("Ignoring OAuth callback with unexpected state");
        return Html(FAILURE_PAGE);
    }

    let outcome = match (params.get("error"), params.get("code")) {
        (Some(error), _) => Err(ClassBatchError::Auth(format!("authorization denied: {error}"))),
        (None, Some(code)) => Ok(code.clone()),
        (None, None) => {
            warn!("Ignoring OAuth callback without a code");
            return Html(FAILURE_PAGE);
        }
    };

    let page = if outcome.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };
    if let Some(sender) = state.sender.lock().take() {
        let _ = sender.send(outcome);
    }
    Html(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hit(server: &CallbackServer, query: &str) -> String {
        reqwest::get(format!("{}?{query}", server.redirect_uri()))
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn delivers_code_for_matching_state() {
        let mut server = CallbackServer::start("xyz").await.unwrap();

        let page = hit(&server, "code=abc&state=xyz").await;

        assert!(page.contains("authorized"));
        assert_eq!(server.wait_for_code(Duration::from_secs(1)).await.unwrap(), "abc");
        server.shutdown().await;
    }

    #[tokio::test]
    async fn ignores_unexpected_state_and_keeps_waiting() {
        let mut server = CallbackServer::start("xyz").await.unwrap();

        let page = hit(&server, "code=evil&state=other").await;
        assert!(page.contains("Failed"));
        hit(&server, "code=good&state=xyz").await;

        assert_eq!(server.wait_for_code(Duration::from_secs(1)).await.unwrap(), "good");
    }

    #[tokio::test]
    async fn denied_consent_is_an_auth_error() {
        let mut server = CallbackServer::start("xyz").await.unwrap();

        hit(&server, "error=access_denied&state=xyz").await;

        let err = server.wait_for_code(Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err, ClassBatchError::Auth("authorization denied: access_denied".into()));
    }

    #[tokio::test]
    async fn error_with_unexpected_state_does_not_abort_sign_in() {
        let mut server = CallbackServer::start("xyz").await.unwrap();

        let page = hit(&server, "error=access_denied").await;
        assert!(page.contains("Failed"));
        hit(&server, "error=access_denied&state=other").await;
        hit(&server, "code=good&state=xyz").await;

        assert_eq!(server.wait_for_code(Duration::from_secs(1)).await.unwrap(), "good");
    }

    #[tokio::test]
    async fn times_out_without_callback() {
        let mut server = CallbackServer::start("xyz").await.unwrap();

        let err = server.wait_for_code(Duration::from_millis(20)).await.unwrap_err();
        assert!(err.is_auth());
    }
}
