//! Batch orchestration against in-memory ports

mod support;

use std::sync::Arc;
use std::time::Duration;

use classbatch_core::{BatchService, Links};
use classbatch_domain::constants::DEFAULT_ANNOUNCEMENT_TEXT;
use classbatch_domain::{AssignmentRequest, ClassBatchError, MaterialPostKind, MaterialRequest};
use serde_json::json;
use support::{classrooms, inline_file, FakeClassroom, FakeStorage};

fn service(classroom: &FakeClassroom, storage: &FakeStorage) -> BatchService {
    BatchService::new(Arc::new(classroom.clone()), Arc::new(storage.clone()), Links::default())
}

fn hw1() -> AssignmentRequest {
    AssignmentRequest { title: "HW1".into(), ..Default::default() }
}

#[tokio::test(start_paused = true)]
async fn failing_target_does_not_stop_the_batch() {
    let classroom = FakeClassroom::new().failing("c2", ClassBatchError::api(403, "Forbidden"));
    let storage = FakeStorage::new();
    let targets = classrooms(&[("c1", "Math"), ("c2", "Science"), ("c3", "Art")]);

    let results = service(&classroom, &storage).create_assignments(&targets, &hw1()).await.unwrap();

    assert_eq!(results.len(), 3);
    let ids: Vec<_> = results.iter().map(|r| r.classroom.id.as_str()).collect();
    assert_eq!(ids, ["c1", "c2", "c3"]);
    assert_eq!(
        serde_json::to_value(&results).unwrap(),
        json!([
            {
                "classroomId": "c1",
                "classroomName": "Math",
                "success": true,
                "assignment": {"id": "w-c1"},
                "assignmentUrl": "https://classroom.google.com/c/c1/a/w-c1"
            },
            {
                "classroomId": "c2",
                "classroomName": "Science",
                "success": false,
                "error": "API call failed: 403 Forbidden"
            },
            {
                "classroomId": "c3",
                "classroomName": "Art",
                "success": true,
                "assignment": {"id": "w-c3"},
                "assignmentUrl": "https://classroom.google.com/c/c3/a/w-c3"
            }
        ])
    );
}

#[tokio::test(start_paused = true)]
async fn targets_are_paced_by_the_configured_delay() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new();
    let targets = classrooms(&[("c1", "A"), ("c2", "B"), ("c3", "C")]);
    let started = tokio::time::Instant::now();

    service(&classroom, &storage)
        .with_inter_call_delay(Duration::from_millis(200))
        .create_assignments(&targets, &hw1())
        .await
        .unwrap();

    let calls = classroom.calls();
    assert_eq!(calls[0].at, started);
    assert!(calls[1].at - calls[0].at >= Duration::from_millis(200));
    assert!(calls[2].at - calls[1].at >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn authentication_failure_aborts_the_batch() {
    let classroom =
        FakeClassroom::new().failing("c2", ClassBatchError::Auth("user declined consent".into()));
    let storage = FakeStorage::new();
    let targets = classrooms(&[("c1", "A"), ("c2", "B"), ("c3", "C")]);

    let err = service(&classroom, &storage).create_assignments(&targets, &hw1()).await.unwrap_err();

    assert!(err.is_auth());
    let attempted: Vec<_> = classroom.calls().into_iter().map(|c| c.target).collect();
    assert_eq!(attempted, ["c1", "c2"]);
}

#[tokio::test(start_paused = true)]
async fn invalid_assignment_is_rejected_before_any_call() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new();
    let targets = classrooms(&[("c1", "A")]);
    let request = AssignmentRequest { title: "  ".into(), ..Default::default() };

    let err = service(&classroom, &storage).create_assignments(&targets, &request).await.unwrap_err();

    assert!(matches!(err, ClassBatchError::InvalidInput(_)));
    assert!(classroom.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn target_without_id_is_rejected() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new();
    let targets = classrooms(&[("c1", "A"), ("", "Nameless")]);

    let err = service(&classroom, &storage).create_assignments(&targets, &hw1()).await.unwrap_err();

    assert!(err.to_string().contains("position 1"));
    assert!(classroom.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn material_batch_without_files_posts_empty_materials_everywhere() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new();
    let targets = classrooms(&[("c1", "A"), ("c2", "B")]);

    let results = service(&classroom, &storage)
        .post_materials(&targets, &MaterialRequest::default(), &[])
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    for call in classroom.calls() {
        assert_eq!(call.operation, "create_announcement");
        assert_eq!(call.body["materials"], json!([]));
        assert_eq!(call.body["text"], json!(DEFAULT_ANNOUNCEMENT_TEXT));
    }
    let first = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(first["filesUploaded"], json!(0));
    assert_eq!(first["announcement"], json!({"id": "a-c1"}));
    assert_eq!(first["announcementUrl"], json!("https://classroom.google.com/c/c1"));
}

#[tokio::test(start_paused = true)]
async fn material_batch_uploads_once_and_drops_failed_files() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new().failing("broken.pdf", ClassBatchError::Upload("500 Internal Server Error".into()));
    let targets = classrooms(&[("c1", "A"), ("c2", "B"), ("c3", "C")]);
    let files = [inline_file("notes.pdf"), inline_file("broken.pdf")];
    let request = MaterialRequest { description: Some("Chapter 3".into()), ..Default::default() };

    let results = service(&classroom, &storage).post_materials(&targets, &request, &files).await.unwrap();

    assert_eq!(storage.calls().len(), 2);
    assert!(results.iter().all(|r| r.is_success()));
    for call in classroom.calls() {
        assert_eq!(call.body["text"], json!("Chapter 3"));
        assert_eq!(
            call.body["materials"],
            json!([{
                "driveFile": {
                    "driveFile": {
                        "id": "f-notes.pdf",
                        "title": "notes.pdf",
                        "alternateLink": "https://drive.google.com/file/d/f-notes.pdf/view"
                    },
                    "shareMode": "VIEW"
                }
            }])
        );
    }
    assert_eq!(serde_json::to_value(&results[2]).unwrap()["filesUploaded"], json!(1));
}

#[tokio::test(start_paused = true)]
async fn material_batch_can_post_classwork_materials() {
    let classroom = FakeClassroom::new().failing("c2", ClassBatchError::api(404, "Not Found"));
    let storage = FakeStorage::new();
    let targets = classrooms(&[("c1", "A"), ("c2", "B")]);

    let results = service(&classroom, &storage)
        .with_material_post(MaterialPostKind::Material)
        .post_materials(&targets, &MaterialRequest::default(), &[inline_file("a.txt")])
        .await
        .unwrap();

    assert!(classroom.calls().iter().all(|c| c.operation == "create_material"));
    let entries = serde_json::to_value(&results).unwrap();
    assert_eq!(entries[0]["material"], json!({"id": "m-c1"}));
    assert_eq!(entries[1]["error"], json!("API call failed: 404 Not Found"));
}

#[tokio::test(start_paused = true)]
async fn lost_credential_during_uploads_aborts_material_batch() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new().failing("a.txt", ClassBatchError::Auth("token revoked".into()));
    let targets = classrooms(&[("c1", "A")]);

    let err = service(&classroom, &storage)
        .post_materials(&targets, &MaterialRequest::default(), &[inline_file("a.txt")])
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert!(classroom.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn file_batch_reports_every_file_without_pacing() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new().failing("big.mov", ClassBatchError::Upload("413 Payload Too Large".into()));
    let files = [inline_file("notes.pdf"), inline_file("big.mov"), inline_file("quiz.docx")];
    let started = tokio::time::Instant::now();

    let results = service(&classroom, &storage).upload_files(&files).await.unwrap();

    assert_eq!(tokio::time::Instant::now(), started);
    let entries = serde_json::to_value(&results).unwrap();
    assert_eq!(
        entries[0],
        json!({
            "fileName": "notes.pdf",
            "success": true,
            "fileId": "f-notes.pdf",
            "downloadUrl": "https://drive.google.com/file/d/f-notes.pdf/view",
            "directUrl": "https://drive.google.com/uc?id=f-notes.pdf"
        })
    );
    assert_eq!(
        entries[1],
        json!({
            "fileName": "big.mov",
            "success": false,
            "error": "File upload failed: 413 Payload Too Large"
        })
    );
    assert_eq!(entries[2]["success"], json!(true));
}

#[tokio::test(start_paused = true)]
async fn file_without_content_rejects_the_whole_upload() {
    let classroom = FakeClassroom::new();
    let storage = FakeStorage::new();
    let mut bad = inline_file("empty.txt");
    bad.data = None;

    let err = service(&classroom, &storage)
        .upload_files(&[inline_file("ok.txt"), bad])
        .await
        .unwrap_err();

    assert!(matches!(err, ClassBatchError::InvalidInput(_)));
    assert!(storage.calls().is_empty());
}
