//! `FileStorage` over the Drive v3 REST API
//!
//! Uploads are two-phase: a multipart `files.create` carrying metadata and
//! content, then a best-effort `permissions.create` that makes the file
//! readable by anyone with the link.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use classbatch_core::FileStorage;
use classbatch_domain::{
    ClassBatchError, FileMetadata, LocalFile, Permission, Result, UploadedFile,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::api::ApiExecutor;
use crate::errors::InfraError;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Drive client
pub struct GoogleDriveClient {
    api: Arc<ApiExecutor>,
    base_url: String,
    upload_base_url: String,
}

impl GoogleDriveClient {
    pub fn new(
        api: Arc<ApiExecutor>,
        base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn transfer(&self, file: &LocalFile, content: Vec<u8>, folder_id: Option<&str>) -> Result<UploadedFile> {
        let metadata = FileMetadata {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            parents: folder_id.map(|id| vec![id.to_string()]).unwrap_or_default(),
        };
        let metadata = serde_json::to_string(&metadata).map_err(|e| ClassBatchError::from(InfraError::from(e)))?;
        let mime = file.mime_type.clone().unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        let url = format!("{}/files?uploadType=multipart", self.upload_base_url);

        let response = self
            .api
            .send_authorized(|| {
                let metadata_part = Part::text(metadata.clone())
                    .mime_str("application/json; charset=UTF-8")
                    .map_err(|e| ClassBatchError::from(InfraError::from(e)))?;
                let file_part = Part::bytes(content.clone())
                    .file_name(file.name.clone())
                    .mime_str(&mime)
                    .map_err(|e| ClassBatchError::from(InfraError::from(e)))?;
                let form = Form::new().part("metadata", metadata_part).part("file", file_part);
                Ok(self.api.http().request(Method::POST, &url).multipart(form))
            })
            .await?;

        response.json::<UploadedFile>().await.map_err(|e| ClassBatchError::from(InfraError::from(e)))
    }

    async fn grant_public_read(&self, file_id: &str) {
        let url = format!("{}/files/{}/permissions", self.base_url, urlencoding::encode(file_id));
        match self.api.post::<_, Value>(&url, &Permission::public_reader()).await {
            Ok(_) => info!(file_id, "File permissions set"),
            Err(err) => warn!(file_id, error = %err, "Could not share file publicly; keeping upload"),
        }
    }
}

#[async_trait]
impl FileStorage for GoogleDriveClient {
    #[instrument(skip(self, file), fields(file = %file.name))]
    async fn upload_file(&self, file: &LocalFile, folder_id: Option<&str>) -> Result<UploadedFile> {
        let content = read_content(file).await.map_err(as_upload_error)?;
        info!(bytes = content.len(), "Uploading file");

        let uploaded = self.transfer(file, content, folder_id).await.map_err(as_upload_error)?;
        info!(file_id = %uploaded.id, "File uploaded");

        self.grant_public_read(&uploaded.id).await;
        Ok(uploaded)
    }
}

/// Resolve file bytes from inline base64 or from the filesystem.
async fn read_content(file: &LocalFile) -> Result<Vec<u8>> {
    file.validate()?;
    match (&file.data, &file.path) {
        (Some(data), _) => {
            let data = data.split_once(";base64,").map_or(data.as_str(), |(_, rest)| rest);
            STANDARD.decode(data.trim()).map_err(|e| InfraError::from(e).into())
        }
        (None, Some(path)) => tokio::fs::read(path).await.map_err(|e| InfraError::from(e).into()),
        (None, None) => Err(ClassBatchError::InvalidInput(format!("file {} has no content", file.name))),
    }
}

/// Everything but a lost credential reads as an upload failure.
fn as_upload_error(err: ClassBatchError) -> ClassBatchError {
    match err {
        ClassBatchError::Auth(_) | ClassBatchError::Upload(_) => err,
        ClassBatchError::Api { status, status_text } => {
            ClassBatchError::Upload(format!("{status} {status_text}"))
        }
        ClassBatchError::Network(msg)
        | ClassBatchError::InvalidInput(msg)
        | ClassBatchError::InvalidResponse(msg)
        | ClassBatchError::Config(msg)
        | ClassBatchError::Internal(msg) => ClassBatchError::Upload(msg),
    }
}
