//! Batch result entries
//!
//! Entries hold a plain `Result` internally. On the wire they become flat
//! objects tagged with `success`: the payload fields are merged next to the
//! target identity on success, and an `error` string replaces them on
//! failure.

use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::types::classroom::{Announcement, ClassroomRef, CourseWork, CourseWorkMaterial};

/// Outcome for one target of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct TargetResult<T> {
    pub classroom: ClassroomRef,
    pub outcome: Result<T, String>,
}

impl<T> TargetResult<T> {
    pub fn success(classroom: ClassroomRef, payload: T) -> Self {
        Self { classroom, outcome: Ok(payload) }
    }

    pub fn failure(classroom: ClassroomRef, error: impl Into<String>) -> Self {
        Self { classroom, outcome: Err(error.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl<T: Serialize> Serialize for TargetResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_entry(
            serializer,
            &[("classroomId", &self.classroom.id), ("classroomName", &self.classroom.name)],
            &self.outcome,
        )
    }
}

/// Successful assignment creation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub assignment: CourseWork,
    pub assignment_url: String,
}

/// What a material batch posted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialPost {
    Announcement(Announcement),
    Material(CourseWorkMaterial),
}

/// Successful material post
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOutcome {
    #[serde(flatten)]
    pub post: MaterialPost,
    pub files_uploaded: usize,
    pub announcement_url: String,
}

/// Links to an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLinks {
    pub file_id: String,
    pub download_url: String,
    pub direct_url: String,
}

/// Outcome for one file of an upload batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    pub file_name: String,
    pub outcome: Result<FileLinks, String>,
}

impl Serialize for FileResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_entry(serializer, &[("fileName", &self.file_name)], &self.outcome)
    }
}

/// Best-effort account probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub authenticated: bool,
    pub has_classrooms: bool,
}

fn serialize_entry<S, T>(
    serializer: S,
    identity: &[(&str, &String)],
    outcome: &Result<T, String>,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut map = serializer.serialize_map(None)?;
    for (key, value) in identity {
        map.serialize_entry(key, value)?;
    }
    match outcome {
        Ok(payload) => {
            map.serialize_entry("success", &true)?;
            match serde_json::to_value(payload).map_err(S::Error::custom)? {
                Value::Object(fields) => {
                    for (key, value) in &fields {
                        map.serialize_entry(key, value)?;
                    }
                }
                Value::Null => {}
                other => return Err(S::Error::custom(format!("payload is not an object: {other}"))),
            }
        }
        Err(error) => {
            map.serialize_entry("success", &false)?;
            map.serialize_entry("error", error)?;
        }
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;

    #[test]
    fn assignment_entries_match_wire_shape() {
        let ok = TargetResult::success(
            ClassroomRef::new("c1", "Math"),
            AssignmentOutcome {
                assignment: CourseWork { id: "w1".into(), extra: Map::new() },
                assignment_url: "https://classroom.google.com/c/c1/a/w1".into(),
            },
        );
        let failed: TargetResult<AssignmentOutcome> =
            TargetResult::failure(ClassroomRef::new("c2", "Science"), "API call failed: 403 Forbidden");

        assert_eq!(
            serde_json::to_value([ok, failed]).unwrap(),
            json!([
                {
                    "classroomId": "c1",
                    "classroomName": "Math",
                    "success": true,
                    "assignment": {"id": "w1"},
                    "assignmentUrl": "https://classroom.google.com/c/c1/a/w1"
                },
                {
                    "classroomId": "c2",
                    "classroomName": "Science",
                    "success": false,
                    "error": "API call failed: 403 Forbidden"
                }
            ])
        );
    }

    #[test]
    fn material_entry_names_the_posted_resource() {
        let entry = TargetResult::success(
            ClassroomRef::new("c1", "Math"),
            MaterialOutcome {
                post: MaterialPost::Material(CourseWorkMaterial { id: "m1".into(), extra: Map::new() }),
                files_uploaded: 2,
                announcement_url: "https://classroom.google.com/c/c1".into(),
            },
        );
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["material"], json!({"id": "m1"}));
        assert_eq!(value["filesUploaded"], json!(2));
        assert!(value.get("announcement").is_none());
    }

    #[test]
    fn file_entries() {
        let ok = FileResult {
            file_name: "notes.pdf".into(),
            outcome: Ok(FileLinks {
                file_id: "f1".into(),
                download_url: "https://drive.google.com/file/d/f1/view".into(),
                direct_url: "https://drive.google.com/uc?id=f1".into(),
            }),
        };
        let failed = FileResult {
            file_name: "big.mov".into(),
            outcome: Err("File upload failed: 413 Payload Too Large".into()),
        };
        assert_eq!(
            serde_json::to_value([ok, failed]).unwrap(),
            json!([
                {
                    "fileName": "notes.pdf",
                    "success": true,
                    "fileId": "f1",
                    "downloadUrl": "https://drive.google.com/file/d/f1/view",
                    "directUrl": "https://drive.google.com/uc?id=f1"
                },
                {
                    "fileName": "big.mov",
                    "success": false,
                    "error": "File upload failed: 413 Payload Too Large"
                }
            ])
        );
    }
}
