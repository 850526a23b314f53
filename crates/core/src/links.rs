//! Deep links handed back to the extension

use classbatch_domain::ApiConfig;

/// Builds user-facing URLs from the configured web bases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    classroom_web: String,
    drive_web: String,
}

impl Links {
    pub fn new(classroom_web: impl Into<String>, drive_web: impl Into<String>) -> Self {
        let trim = |s: String| s.trim_end_matches('/').to_string();
        Self { classroom_web: trim(classroom_web.into()), drive_web: trim(drive_web.into()) }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(api.classroom_web_base_url.clone(), api.drive_web_base_url.clone())
    }

    /// `<classroom>/c/<course>/a/<assignment>`
    pub fn assignment_url(&self, course_id: &str, assignment_id: &str) -> String {
        format!("{}/c/{course_id}/a/{assignment_id}", self.classroom_web)
    }

    /// `<classroom>/c/<course>`
    pub fn course_url(&self, course_id: &str) -> String {
        format!("{}/c/{course_id}", self.classroom_web)
    }

    /// `<drive>/file/d/<id>/view`
    pub fn file_view_url(&self, file_id: &str) -> String {
        format!("{}/file/d/{file_id}/view", self.drive_web)
    }

    /// `<drive>/uc?id=<id>`
    pub fn file_direct_url(&self, file_id: &str) -> String {
        format!("{}/uc?id={file_id}", self.drive_web)
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}
