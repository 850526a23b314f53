//! Batch commands
//!
//! Thin adapters from decoded payloads to [`classbatch_core::BatchService`].
//! Per-target failures live inside `results`; only invalid input and a lost
//! credential fail the command itself.

use classbatch_domain::{AssignmentOutcome, FileResult, MaterialOutcome, Result, TargetResult};

use crate::context::AppContext;
use crate::protocol::{BatchAssignmentPayload, BatchMaterialPayload, ResultsReply, UploadFilesPayload};
use crate::utils::execute_command;

pub async fn batch_create_assignment(
    ctx: &AppContext,
    payload: BatchAssignmentPayload,
) -> Result<ResultsReply<TargetResult<AssignmentOutcome>>> {
    execute_command("batch::create_assignment", async {
        let results = ctx.batch.create_assignments(&payload.classrooms, &payload.assignment).await?;
        Ok(ResultsReply { results })
    })
    .await
}

pub async fn batch_upload_material(
    ctx: &AppContext,
    payload: BatchMaterialPayload,
) -> Result<ResultsReply<TargetResult<MaterialOutcome>>> {
    execute_command("batch::upload_material", async {
        let results = ctx
            .batch
            .post_materials(&payload.classrooms, &payload.material, &payload.files)
            .await?;
        Ok(ResultsReply { results })
    })
    .await
}

pub async fn upload_files(
    ctx: &AppContext,
    payload: UploadFilesPayload,
) -> Result<ResultsReply<FileResult>> {
    execute_command("batch::upload_files", async {
        let results = ctx.batch.upload_files(&payload.files).await?;
        Ok(ResultsReply { results })
    })
    .await
}
