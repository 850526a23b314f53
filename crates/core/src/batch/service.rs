//! Batch orchestrator - core business logic

use std::sync::Arc;
use std::time::Duration;

use classbatch_domain::{
    AssignmentOutcome, AssignmentRequest, BatchConfig, ClassBatchError, ClassroomRef, FileLinks,
    FileResult, LocalFile, Material, MaterialOutcome, MaterialPost, MaterialPostKind,
    MaterialRequest, Result, TargetResult,
};
use tracing::{debug, info, warn};

use crate::classroom::{ClassroomGateway, FileStorage};
use crate::links::Links;

/// Sequential, per-target batch runner
///
/// Holds no state between batches. A failed target is recorded and the
/// loop moves on; only an authentication failure stops a batch, since no
/// later target could succeed without a credential.
pub struct BatchService {
    classroom: Arc<dyn ClassroomGateway>,
    storage: Arc<dyn FileStorage>,
    links: Links,
    inter_call_delay: Duration,
    material_post: MaterialPostKind,
}

impl BatchService {
    /// Create a batch service with default pacing
    pub fn new(
        classroom: Arc<dyn ClassroomGateway>,
        storage: Arc<dyn FileStorage>,
        links: Links,
    ) -> Self {
        let defaults = BatchConfig::default();
        Self {
            classroom,
            storage,
            links,
            inter_call_delay: Duration::from_millis(defaults.inter_call_delay_ms),
            material_post: defaults.material_post,
        }
    }

    /// Apply the `batch` configuration section
    pub fn with_config(self, config: &BatchConfig) -> Self {
        self.with_inter_call_delay(Duration::from_millis(config.inter_call_delay_ms))
            .with_material_post(config.material_post)
    }

    /// Pause before every target after the first
    pub fn with_inter_call_delay(mut self, delay: Duration) -> Self {
        self.inter_call_delay = delay;
        self
    }

    /// Choose what a material batch posts
    pub fn with_material_post(mut self, kind: MaterialPostKind) -> Self {
        self.material_post = kind;
        self
    }

    /// Create the same assignment in every target.
    ///
    /// # Errors
    /// `InvalidInput` before any remote call for a bad request or target;
    /// `Auth` if the credential is lost mid-batch.
    pub async fn create_assignments(
        &self,
        targets: &[ClassroomRef],
        request: &AssignmentRequest,
    ) -> Result<Vec<TargetResult<AssignmentOutcome>>> {
        validate_targets(targets)?;
        request.validate()?;
        info!(title = %request.title, targets = targets.len(), "Creating assignment batch");

        let mut results = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            self.pace(index).await;
            let outcome = self
                .classroom
                .create_assignment(&target.id, request)
                .await
                .map(|assignment| AssignmentOutcome {
                    assignment_url: self.links.assignment_url(&target.id, &assignment.id),
                    assignment,
                });
            results.push(record(target, outcome)?);
        }

        log_summary("assignment", &results);
        Ok(results)
    }

    /// Upload `files` once, then post them to every target.
    ///
    /// Files that fail to upload are logged and left out of the posts.
    ///
    /// # Errors
    /// `InvalidInput` before any remote call for a bad target or file;
    /// `Auth` if the credential is lost mid-batch.
    pub async fn post_materials(
        &self,
        targets: &[ClassroomRef],
        request: &MaterialRequest,
        files: &[LocalFile],
    ) -> Result<Vec<TargetResult<MaterialOutcome>>> {
        validate_targets(targets)?;
        validate_files(files)?;
        info!(
            targets = targets.len(),
            files = files.len(),
            post = %self.material_post,
            "Creating material batch"
        );

        let mut materials = Vec::with_capacity(files.len());
        for file in files {
            match self.storage.upload_file(file, None).await {
                Ok(uploaded) => {
                    debug!(file = %file.name, file_id = %uploaded.id, "File uploaded");
                    let title = if uploaded.name.is_empty() { &file.name } else { &uploaded.name };
                    let link = self.links.file_view_url(&uploaded.id);
                    materials.push(Material::drive_file(uploaded.id.clone(), title.clone(), link));
                }
                Err(err) if err.is_auth() => return Err(err),
                Err(err) => warn!(file = %file.name, error = %err, "Skipping file that failed to upload"),
            }
        }
        let files_uploaded = materials.len();

        let mut results = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            self.pace(index).await;
            let outcome = self.post_one(&target.id, request, materials.clone()).await.map(|post| {
                MaterialOutcome {
                    post,
                    files_uploaded,
                    announcement_url: self.links.course_url(&target.id),
                }
            });
            results.push(record(target, outcome)?);
        }

        log_summary("material", &results);
        Ok(results)
    }

    /// Upload each file; one entry per file, no pacing.
    ///
    /// # Errors
    /// `InvalidInput` before any upload for a bad file; `Auth` if the
    /// credential is lost mid-batch.
    pub async fn upload_files(&self, files: &[LocalFile]) -> Result<Vec<FileResult>> {
        validate_files(files)?;
        info!(files = files.len(), "Uploading files");

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let outcome = match self.storage.upload_file(file, None).await {
                Ok(uploaded) => Ok(FileLinks {
                    download_url: self.links.file_view_url(&uploaded.id),
                    direct_url: self.links.file_direct_url(&uploaded.id),
                    file_id: uploaded.id,
                }),
                Err(err) if err.is_auth() => return Err(err),
                Err(err) => {
                    warn!(file = %file.name, error = %err, "File upload failed");
                    Err(err.to_string())
                }
            };
            results.push(FileResult { file_name: file.name.clone(), outcome });
        }

        let uploaded = results.iter().filter(|r| r.outcome.is_ok()).count();
        info!(uploaded, failed = results.len() - uploaded, "File batch finished");
        Ok(results)
    }

    async fn post_one(
        &self,
        course_id: &str,
        request: &MaterialRequest,
        materials: Vec<Material>,
    ) -> Result<MaterialPost> {
        match self.material_post {
            MaterialPostKind::Announcement => self
                .classroom
                .create_announcement(course_id, &request.announcement(materials))
                .await
                .map(MaterialPost::Announcement),
            MaterialPostKind::Material => self
                .classroom
                .create_material(course_id, &request.course_work_material(materials))
                .await
                .map(MaterialPost::Material),
        }
    }

    async fn pace(&self, index: usize) {
        if index > 0 && !self.inter_call_delay.is_zero() {
            tokio::time::sleep(self.inter_call_delay).await;
        }
    }
}

/// Turn one target's outcome into an entry; authentication failures escape.
fn record<T>(target: &ClassroomRef, outcome: Result<T>) -> Result<TargetResult<T>> {
    match outcome {
        Ok(payload) => {
            debug!(classroom = %target.name, "Target succeeded");
            Ok(TargetResult::success(target.clone(), payload))
        }
        Err(err) if err.is_auth() => {
            warn!(classroom = %target.name, error = %err, "Aborting batch");
            Err(err)
        }
        Err(err) => {
            warn!(classroom = %target.name, error = %err, "Target failed");
            Ok(TargetResult::failure(target.clone(), err.to_string()))
        }
    }
}

fn log_summary<T>(kind: &str, results: &[TargetResult<T>]) {
    let succeeded = results.iter().filter(|r| r.is_success()).count();
    info!(kind, succeeded, failed = results.len() - succeeded, "Batch finished");
}

fn validate_targets(targets: &[ClassroomRef]) -> Result<()> {
    if let Some(position) = targets.iter().position(|t| t.id.trim().is_empty()) {
        return Err(ClassBatchError::InvalidInput(format!(
            "classroom at position {position} has no id"
        )));
    }
    Ok(())
}

fn validate_files(files: &[LocalFile]) -> Result<()> {
    files.iter().try_for_each(LocalFile::validate)
}
