//! Caller-supplied requests
//!
//! Requests arrive as loosely typed JSON from the extension. They are decoded
//! here, validated before any remote call, and translated into the remote
//! schemas of [`crate::types::classroom`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::constants::{DEFAULT_ANNOUNCEMENT_TEXT, DEFAULT_MATERIAL_TITLE};
use crate::errors::{ClassBatchError, Result};
use crate::types::classroom::{
    Date, Material, NewAnnouncement, NewCourseWork, NewCourseWorkMaterial, PublicationState,
    SubmissionModificationMode, TimeOfDay, WorkType,
};

/// Assignment to create in every target classroom
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Whole points; zero or empty means ungraded.
    #[serde(default, deserialize_with = "deserialize_points")]
    pub points: Option<i64>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub allow_late: bool,
    #[serde(default)]
    pub materials: Vec<Material>,
}

impl AssignmentRequest {
    /// Reject requests that cannot produce a valid course work.
    ///
    /// # Errors
    /// `InvalidInput` for a blank title, negative points or an unparseable
    /// due date.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ClassBatchError::InvalidInput("assignment title is required".into()));
        }
        if self.points.is_some_and(|p| p < 0) {
            return Err(ClassBatchError::InvalidInput("points must not be negative".into()));
        }
        self.due()?;
        Ok(())
    }

    /// Due date and time in UTC, if one was given.
    ///
    /// # Errors
    /// `InvalidInput` when the due date cannot be parsed.
    pub fn due(&self) -> Result<Option<(Date, TimeOfDay)>> {
        match self.due_date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_due_date(raw).map(Some),
        }
    }

    /// Translate into the `courseWork` body.
    ///
    /// # Errors
    /// Same as [`AssignmentRequest::validate`].
    pub fn to_course_work(&self) -> Result<NewCourseWork> {
        self.validate()?;
        let due = self.due()?;
        Ok(NewCourseWork {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            work_type: WorkType::Assignment,
            state: PublicationState::Published,
            max_points: self.points,
            due_date: due.map(|(date, _)| date),
            due_time: due.map(|(_, time)| time),
            submission_modification_mode: if self.allow_late {
                SubmissionModificationMode::ModifiableUntilTurnedIn
            } else {
                SubmissionModificationMode::Modifiable
            },
            materials: self.materials.clone(),
        })
    }
}

/// Announcement to post in one classroom
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnnouncementRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

impl AnnouncementRequest {
    pub fn to_announcement(&self) -> NewAnnouncement {
        NewAnnouncement {
            text: non_blank(self.text.as_deref()).unwrap_or(DEFAULT_ANNOUNCEMENT_TEXT).to_string(),
            state: PublicationState::Published,
            materials: self.materials.clone(),
        }
    }
}

/// Material batch request
///
/// The post body comes from `text`, falling back to `description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MaterialRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MaterialRequest {
    /// First non-blank of `text` and `description`.
    pub fn body(&self) -> Option<&str> {
        non_blank(self.text.as_deref()).or_else(|| non_blank(self.description.as_deref()))
    }

    /// Announcement carrying `materials`.
    pub fn announcement(&self, materials: Vec<Material>) -> AnnouncementRequest {
        AnnouncementRequest { text: self.body().map(str::to_string), materials }
    }

    /// Classwork material carrying `materials`.
    pub fn course_work_material(&self, materials: Vec<Material>) -> NewCourseWorkMaterial {
        NewCourseWorkMaterial {
            title: non_blank(self.title.as_deref()).unwrap_or(DEFAULT_MATERIAL_TITLE).to_string(),
            description: self.body().unwrap_or(DEFAULT_ANNOUNCEMENT_TEXT).to_string(),
            state: PublicationState::Published,
            materials,
        }
    }
}

/// File to upload, given inline (base64) or by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFile {
    pub name: String,
    #[serde(default, alias = "type")]
    pub mime_type: Option<String>,
    /// Base64 content
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl LocalFile {
    /// # Errors
    /// `InvalidInput` without a name or without exactly one content source.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ClassBatchError::InvalidInput("file name is required".into()));
        }
        match (&self.data, &self.path) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            (None, None) => Err(ClassBatchError::InvalidInput(format!(
                "file {} has neither data nor path",
                self.name
            ))),
            (Some(_), Some(_)) => Err(ClassBatchError::InvalidInput(format!(
                "file {} has both data and path",
                self.name
            ))),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

const NAIVE_DUE_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parse a due date into UTC date and time.
///
/// Accepted forms:
/// - RFC 3339 with offset (`2025-03-01T17:00:00+01:00`), converted to UTC
/// - naive date-time (`2025-03-01T16:00`, seconds and fractions optional),
///   taken as UTC
/// - bare date (`2025-03-01`), due at 23:59
fn parse_due_date(raw: &str) -> Result<(Date, TimeOfDay)> {
    let utc = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc).naive_utc()
    } else if let Some(naive) =
        NAIVE_DUE_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        naive
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0)
            .ok_or_else(|| ClassBatchError::Internal("invalid end-of-day time".into()))?;
        date.and_time(end_of_day)
    } else {
        return Err(ClassBatchError::InvalidInput(format!("unrecognized due date: {raw}")));
    };

    Ok((
        Date { year: utc.year(), month: utc.month(), day: utc.day() },
        TimeOfDay { hours: utc.hour(), minutes: utc.minute() },
    ))
}

#[allow(clippy::cast_possible_truncation)]
fn deserialize_points<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let number = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => return Err(D::Error::custom(format!("points must be numeric, got {other}"))),
    };
    let number = number
        .filter(|n| n.is_finite())
        .ok_or_else(|| D::Error::custom("points must be a finite number"))?;
    let whole = number.trunc() as i64;
    Ok((whole != 0).then_some(whole))
}
