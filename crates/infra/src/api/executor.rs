//! Remote call executor with one-shot credential refresh

use std::sync::Arc;

use classbatch_core::CredentialHolder;
use classbatch_domain::{ClassBatchError, Credential, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Sends authorized requests on behalf of the Classroom and Drive clients
pub struct ApiExecutor {
    http: HttpClient,
    credentials: Arc<CredentialHolder>,
}

impl ApiExecutor {
    pub fn new(http: HttpClient, credentials: Arc<CredentialHolder>) -> Self {
        Self { http, credentials }
    }

    /// The underlying transport, for building requests.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn credentials(&self) -> &Arc<CredentialHolder> {
        &self.credentials
    }

    /// Send a request built by `build` with the current bearer credential.
    ///
    /// `build` runs once per attempt so that bodies which cannot be cloned
    /// (multipart) are rebuilt for the retry. A 401 triggers one credential
    /// refresh and one retry; any other non-2xx status fails immediately.
    ///
    /// # Errors
    /// - `Auth` when no credential can be obtained
    /// - `Api` with the status of the last response
    /// - `Network` for transport failures (never retried)
    pub async fn send_authorized<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> Result<RequestBuilder> + Send + Sync,
    {
        let credential = self.credentials.get().await?;
        let response = self.attempt(&build, &credential).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response);
        }

        warn!("Credential rejected with 401, refreshing and retrying once");
        let fresh = self.credentials.refresh(&credential).await?;
        let retry = self.attempt(&build, &fresh).await?;
        ensure_success(retry)
    }

    /// JSON call: `body` is sent as JSON for non-GET methods, and the response
    /// body is decoded into `T` (an empty body decodes from `null`).
    ///
    /// # Errors
    /// Same as [`ApiExecutor::send_authorized`], plus `InvalidResponse` when
    /// the body cannot be decoded.
    #[instrument(skip(self, body))]
    pub async fn call<B, T>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send_authorized(|| {
                let request = self.http.request(method.clone(), url);
                Ok(match body {
                    Some(body) if method != Method::GET => request.json(body),
                    _ => request,
                })
            })
            .await?;

        let bytes = response.bytes().await.map_err(|e| ClassBatchError::from(InfraError::from(e)))?;
        let value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ClassBatchError::from(InfraError::from(e)))?
        };
        debug!("API call succeeded");
        serde_json::from_value(value).map_err(|e| {
            ClassBatchError::InvalidResponse(format!("unexpected response shape: {e}"))
        })
    }

    /// `GET url`
    ///
    /// # Errors
    /// See [`ApiExecutor::call`].
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.call::<Value, T>(Method::GET, url, None).await
    }

    /// `POST url` with a JSON body
    ///
    /// # Errors
    /// See [`ApiExecutor::call`].
    pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::POST, url, Some(body)).await
    }

    async fn attempt<F>(&self, build: &F, credential: &Credential) -> Result<Response>
    where
        F: Fn() -> Result<RequestBuilder> + Send + Sync,
    {
        let request = build()?.header(AUTHORIZATION, credential.bearer());
        self.http.send(request).await
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClassBatchError::api(status.as_u16(), status.canonical_reason().unwrap_or("")))
    }
}
