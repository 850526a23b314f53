//! Google Classroom and Drive resource schemas
//!
//! Resources returned by the remote APIs keep every field they were sent
//! with: known fields are typed, the rest land in `extra` and are written
//! back unchanged when the resource is handed to the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One target classroom, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl ClassroomRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// A course as listed by `courses.list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of `courses.list`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseList {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Calendar date, months and days 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Time of day (UTC on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hours: u32,
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkType {
    Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationState {
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionModificationMode {
    /// Students may edit until they turn the work in
    ModifiableUntilTurnedIn,
    Modifiable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareMode {
    View,
}

/// Drive file reference inside a Classroom material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDriveFile {
    pub drive_file: DriveFile,
    pub share_mode: ShareMode,
}

/// Attachment of a post
///
/// Only Drive files are built by the host. Other kinds (links, videos,
/// forms) supplied by the caller pass through in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_file: Option<SharedDriveFile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    /// View-only attachment pointing at an uploaded Drive file.
    pub fn drive_file(id: impl Into<String>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            drive_file: Some(SharedDriveFile {
                drive_file: DriveFile {
                    id: id.into(),
                    title: Some(title.into()),
                    alternate_link: Some(link.into()),
                },
                share_mode: ShareMode::View,
            }),
            extra: Map::new(),
        }
    }
}

/// Body of `courses.courseWork.create`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseWork {
    pub title: String,
    pub description: String,
    pub work_type: WorkType,
    pub state: PublicationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<TimeOfDay>,
    pub submission_modification_mode: SubmissionModificationMode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
}

/// Body of `courses.announcements.create`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnnouncement {
    pub text: String,
    pub state: PublicationState,
    pub materials: Vec<Material>,
}

/// Body of `courses.courseWorkMaterials.create`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCourseWorkMaterial {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub state: PublicationState,
    pub materials: Vec<Material>,
}

macro_rules! remote_resource {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub id: String,
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }
    };
}

remote_resource!(
    /// Created assignment
    CourseWork
);
remote_resource!(
    /// Created announcement
    Announcement
);
remote_resource!(
    /// Created classwork material
    CourseWorkMaterial
);

/// Metadata part of a multipart Drive upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

/// Drive file as returned by `files.create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `permissions.create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub role: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl Permission {
    /// Anyone with the link can read.
    pub const fn public_reader() -> Self {
        Self { role: "reader", kind: "anyone" }
    }
}
