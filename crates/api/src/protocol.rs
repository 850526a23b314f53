//! Message contract with the browser extension
//!
//! Requests are `{action, data?, requestId?}`. Every response is a flat
//! object carrying `success` plus either the payload fields or `error`.

use classbatch_domain::{
    AssignmentRequest, ClassBatchError, ClassroomRef, Course, LocalFile, MaterialRequest, UserInfo,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One message from the extension
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub action: String,
    #[serde(default)]
    pub data: Option<Value>,
    /// Opaque correlation value, echoed back untouched.
    #[serde(default)]
    pub request_id: Option<Value>,
}

/// Normalized response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Response(Map<String, Value>);

impl Response {
    /// `{success: true, ...payload}`; the payload must serialize to an object.
    pub fn success<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(Value::Object(mut fields)) => {
                fields.insert("success".into(), Value::Bool(true));
                Self(fields)
            }
            Ok(Value::Null) => Self::success(&Map::new()),
            Ok(other) => Self::failure(format!("Internal error: payload is not an object: {other}")),
            Err(err) => Self::failure(format!("Internal error: {err}")),
        }
    }

    /// `{success: false, error}`
    pub fn failure(error: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("success".into(), Value::Bool(false));
        fields.insert("error".into(), Value::String(error.into()));
        Self(fields)
    }

    pub fn from_result<T: Serialize>(result: Result<T, ClassBatchError>) -> Self {
        match result {
            Ok(payload) => Self::success(&payload),
            Err(err) => Self::failure(err.to_string()),
        }
    }

    pub fn with_request_id(mut self, request_id: Option<Value>) -> Self {
        if let Some(id) = request_id {
            self.0.insert("requestId".into(), id);
        }
        self
    }

    pub fn request_id(&self) -> Option<&Value> {
        self.0.get("requestId")
    }

    pub fn is_success(&self) -> bool {
        self.0.get("success") == Some(&Value::Bool(true))
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

// Payloads

#[derive(Debug, Clone, Deserialize)]
pub struct BatchAssignmentPayload {
    pub classrooms: Vec<ClassroomRef>,
    pub assignment: AssignmentRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchMaterialPayload {
    pub classrooms: Vec<ClassroomRef>,
    #[serde(default)]
    pub material: MaterialRequest,
    #[serde(default)]
    pub files: Vec<LocalFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadFilesPayload {
    pub files: Vec<LocalFile>,
}

// Response bodies

#[derive(Debug, Clone, Serialize)]
pub struct TokenReply {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoursesReply {
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoReply {
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsReply<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReply {
    pub message: String,
    pub timestamp: String,
    pub api_integration: String,
    pub version: String,
}
