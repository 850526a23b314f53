//! Port interfaces for the Classroom and Drive APIs

use async_trait::async_trait;
use classbatch_domain::{
    Announcement, AnnouncementRequest, AssignmentRequest, Course, CourseWork, CourseWorkMaterial,
    LocalFile, NewCourseWorkMaterial, Result, UploadedFile, UserInfo,
};

/// Google Classroom operations used by the host
#[async_trait]
pub trait ClassroomGateway: Send + Sync {
    /// Active courses taught by the current user, in remote order
    async fn list_courses(&self) -> Result<Vec<Course>>;

    /// Create a published assignment
    async fn create_assignment(
        &self,
        course_id: &str,
        request: &AssignmentRequest,
    ) -> Result<CourseWork>;

    /// Post a published announcement
    async fn create_announcement(
        &self,
        course_id: &str,
        request: &AnnouncementRequest,
    ) -> Result<Announcement>;

    /// Post a published classwork material
    async fn create_material(
        &self,
        course_id: &str,
        material: &NewCourseWorkMaterial,
    ) -> Result<CourseWorkMaterial>;

    /// Probe the account. Never fails; any error reads as unauthenticated.
    async fn user_info(&self) -> UserInfo;
}

/// Google Drive file storage
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Upload a file and make it readable by anyone with the link.
    ///
    /// A failure to grant the permission does not fail the upload.
    async fn upload_file(&self, file: &LocalFile, folder_id: Option<&str>) -> Result<UploadedFile>;
}
