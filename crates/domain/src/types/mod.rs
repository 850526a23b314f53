//! Domain types and models
//!
//! - `classroom`: Classroom and Drive resource schemas as exchanged with the
//!   remote APIs
//! - `requests`: caller-supplied requests and their translation into remote
//!   schemas
//! - `results`: per-target and per-file batch result entries
//! - `credential`: the bearer credential

pub mod classroom;
pub mod credential;
pub mod requests;
pub mod results;

pub use classroom::{
    Announcement, ClassroomRef, Course, CourseList, CourseWork, CourseWorkMaterial, Date,
    DriveFile, FileMetadata, Material, NewAnnouncement, NewCourseWork, NewCourseWorkMaterial,
    Permission, PublicationState, ShareMode, SharedDriveFile, SubmissionModificationMode,
    TimeOfDay, UploadedFile, WorkType,
};
pub use credential::Credential;
pub use requests::{AnnouncementRequest, AssignmentRequest, LocalFile, MaterialRequest};
pub use results::{
    AssignmentOutcome, FileLinks, FileResult, MaterialOutcome, MaterialPost, TargetResult,
    UserInfo,
};
