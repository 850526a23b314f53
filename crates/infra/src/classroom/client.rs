//! `ClassroomGateway` over the Classroom v1 REST API

use std::sync::Arc;

use async_trait::async_trait;
use classbatch_core::ClassroomGateway;
use classbatch_domain::constants::{COURSE_PAGE_SIZE, DEFAULT_MAX_COURSE_PAGES};
use classbatch_domain::{
    Announcement, AnnouncementRequest, AssignmentRequest, Course, CourseList, CourseWork,
    CourseWorkMaterial, NewCourseWorkMaterial, Result, UserInfo,
};
use tracing::{debug, info, instrument, warn};

use crate::api::ApiExecutor;

/// Classroom client
pub struct GoogleClassroomClient {
    api: Arc<ApiExecutor>,
    base_url: String,
    max_pages: u32,
}

impl GoogleClassroomClient {
    pub fn new(api: Arc<ApiExecutor>, base_url: impl Into<String>) -> Self {
        Self {
            api,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_pages: DEFAULT_MAX_COURSE_PAGES,
        }
    }

    /// Stop following `nextPageToken` after this many pages.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn course_url(&self, course_id: &str, collection: &str) -> String {
        format!("{}/courses/{}/{collection}", self.base_url, urlencoding::encode(course_id))
    }
}

#[async_trait]
impl ClassroomGateway for GoogleClassroomClient {
    #[instrument(skip(self))]
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let mut courses = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 1..=self.max_pages {
            let mut url = format!(
                "{}/courses?teacherId=me&courseStates=ACTIVE&pageSize={COURSE_PAGE_SIZE}",
                self.base_url
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(&urlencoding::encode(token));
            }

            let list: CourseList = self.api.get(&url).await?;
            debug!(page, count = list.courses.len(), "Fetched course page");
            courses.extend(list.courses);

            match list.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
            if page == self.max_pages {
                warn!(max_pages = self.max_pages, "Course listing truncated at page limit");
            }
        }

        info!(count = courses.len(), "Courses retrieved");
        Ok(courses)
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    async fn create_assignment(
        &self,
        course_id: &str,
        request: &AssignmentRequest,
    ) -> Result<CourseWork> {
        let body = request.to_course_work()?;
        let created: CourseWork = self.api.post(&self.course_url(course_id, "courseWork"), &body).await?;
        info!(course_id, assignment_id = %created.id, "Assignment created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    async fn create_announcement(
        &self,
        course_id: &str,
        request: &AnnouncementRequest,
    ) -> Result<Announcement> {
        let body = request.to_announcement();
        let created: Announcement =
            self.api.post(&self.course_url(course_id, "announcements"), &body).await?;
        info!(course_id, announcement_id = %created.id, materials = body.materials.len(), "Announcement posted");
        Ok(created)
    }

    #[instrument(skip(self, material))]
    async fn create_material(
        &self,
        course_id: &str,
        material: &NewCourseWorkMaterial,
    ) -> Result<CourseWorkMaterial> {
        let created: CourseWorkMaterial =
            self.api.post(&self.course_url(course_id, "courseWorkMaterials"), material).await?;
        info!(course_id, material_id = %created.id, "Material posted");
        Ok(created)
    }

    async fn user_info(&self) -> UserInfo {
        let url = format!("{}/courses?teacherId=me&pageSize=1", self.base_url);
        match self.api.get::<CourseList>(&url).await {
            Ok(list) => UserInfo { authenticated: true, has_classrooms: !list.courses.is_empty() },
            Err(err) => {
                warn!(error = %err, "User info probe failed");
                UserInfo::default()
            }
        }
    }
}
