//! Application context - dependency injection container

use std::sync::Arc;

use classbatch_core::{BatchService, ClassroomGateway, CredentialHolder, CredentialProvider, FileStorage, Links};
use classbatch_domain::{HostConfig, Result};
use classbatch_infra::identity::provider_from_config;
use classbatch_infra::{ApiExecutor, GoogleClassroomClient, GoogleDriveClient, HttpClient};
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: HostConfig,
    pub credentials: Arc<CredentialHolder>,
    pub classroom: Arc<dyn ClassroomGateway>,
    pub storage: Arc<dyn FileStorage>,
    pub batch: BatchService,
}

impl AppContext {
    /// Wire the production stack from configuration.
    ///
    /// # Errors
    /// `Config` when no credential source is configured, or an HTTP client
    /// cannot be built.
    pub fn new(config: HostConfig) -> Result<Self> {
        let http = HttpClient::from_config(&config.http)?;
        let provider = provider_from_config(&config, http)?;
        Self::with_provider(config, provider)
    }

    /// Wire the production clients around an explicit credential provider.
    ///
    /// # Errors
    /// `Network` when the HTTP client cannot be built.
    pub fn with_provider(config: HostConfig, provider: Arc<dyn CredentialProvider>) -> Result<Self> {
        let credentials = Arc::new(CredentialHolder::new(provider));
        let api = Arc::new(ApiExecutor::new(HttpClient::from_config(&config.http)?, Arc::clone(&credentials)));

        let classroom: Arc<dyn ClassroomGateway> = Arc::new(
            GoogleClassroomClient::new(Arc::clone(&api), config.api.classroom_base_url.clone())
                .with_max_pages(config.batch.max_course_pages),
        );
        let storage: Arc<dyn FileStorage> = Arc::new(GoogleDriveClient::new(
            api,
            config.api.drive_base_url.clone(),
            config.api.drive_upload_base_url.clone(),
        ));

        Ok(Self::from_parts(config, credentials, classroom, storage))
    }

    /// Assemble a context from ready-made services.
    pub fn from_parts(
        config: HostConfig,
        credentials: Arc<CredentialHolder>,
        classroom: Arc<dyn ClassroomGateway>,
        storage: Arc<dyn FileStorage>,
    ) -> Self {
        let batch = BatchService::new(
            Arc::clone(&classroom),
            Arc::clone(&storage),
            Links::from_config(&config.api),
        )
        .with_config(&config.batch);

        info!(
            inter_call_delay_ms = config.batch.inter_call_delay_ms,
            material_post = %config.batch.material_post,
            "Application context ready"
        );

        Self { config, credentials, classroom, storage, batch }
    }
}
