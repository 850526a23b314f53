//! Shared test helpers for `classbatch-core` integration tests.
//!
//! In-memory fakes of the Classroom and Drive ports. Both record every call
//! with the (possibly paused) tokio clock so tests can check ordering and
//! pacing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use classbatch_core::{ClassroomGateway, FileStorage};
use classbatch_domain::{
    Announcement, AnnouncementRequest, AssignmentRequest, ClassBatchError, ClassroomRef, Course,
    CourseWork, CourseWorkMaterial, LocalFile, NewCourseWorkMaterial, Result, UploadedFile,
    UserInfo,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::time::Instant;

/// One recorded remote call
#[derive(Debug, Clone)]
pub struct Call {
    pub operation: &'static str,
    pub target: String,
    pub at: Instant,
    pub body: Value,
}

/// Classroom fake that succeeds unless a failure was scripted for a course.
#[derive(Default, Clone)]
pub struct FakeClassroom {
    failures: Arc<Mutex<HashMap<String, ClassBatchError>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeClassroom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call against `course_id` fails with `error`.
    pub fn failing(self, course_id: &str, error: ClassBatchError) -> Self {
        self.failures.lock().insert(course_id.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, operation: &'static str, target: &str, body: Value) -> Result<()> {
        self.calls.lock().push(Call {
            operation,
            target: target.to_string(),
            at: Instant::now(),
            body,
        });
        match self.failures.lock().get(target) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[async_trait]
impl ClassroomGateway for FakeClassroom {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.record("list_courses", "", Value::Null)?;
        Ok(Vec::new())
    }

    async fn create_assignment(
        &self,
        course_id: &str,
        request: &AssignmentRequest,
    ) -> Result<CourseWork> {
        self.record("create_assignment", course_id, to_json(&request.to_course_work()?))?;
        Ok(CourseWork { id: format!("w-{course_id}"), extra: Map::new() })
    }

    async fn create_announcement(
        &self,
        course_id: &str,
        request: &AnnouncementRequest,
    ) -> Result<Announcement> {
        self.record("create_announcement", course_id, to_json(&request.to_announcement()))?;
        Ok(Announcement { id: format!("a-{course_id}"), extra: Map::new() })
    }

    async fn create_material(
        &self,
        course_id: &str,
        material: &NewCourseWorkMaterial,
    ) -> Result<CourseWorkMaterial> {
        self.record("create_material", course_id, to_json(material))?;
        Ok(CourseWorkMaterial { id: format!("m-{course_id}"), extra: Map::new() })
    }

    async fn user_info(&self) -> UserInfo {
        UserInfo { authenticated: true, has_classrooms: false }
    }
}

/// Drive fake; file ids are `f-<name>`.
#[derive(Default, Clone)]
pub struct FakeStorage {
    failures: Arc<Mutex<HashMap<String, ClassBatchError>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploading `file_name` fails with `error`.
    pub fn failing(self, file_name: &str, error: ClassBatchError) -> Self {
        self.failures.lock().insert(file_name.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl FileStorage for FakeStorage {
    async fn upload_file(&self, file: &LocalFile, _folder_id: Option<&str>) -> Result<UploadedFile> {
        self.calls.lock().push(Call {
            operation: "upload_file",
            target: file.name.clone(),
            at: Instant::now(),
            body: Value::Null,
        });
        if let Some(err) = self.failures.lock().get(&file.name) {
            return Err(err.clone());
        }
        Ok(UploadedFile {
            id: format!("f-{}", file.name),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            web_view_link: None,
            extra: Map::new(),
        })
    }
}

pub fn classrooms(pairs: &[(&str, &str)]) -> Vec<ClassroomRef> {
    pairs.iter().map(|(id, name)| ClassroomRef::new(*id, *name)).collect()
}

pub fn inline_file(name: &str) -> LocalFile {
    LocalFile {
        name: name.to_string(),
        mime_type: Some("text/plain".into()),
        data: Some("aGVsbG8=".into()),
        path: None,
    }
}
