use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Course record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /course` and `PUT /course/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    #[validate(length(min = 1, message = "Course name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Course description is required"))]
    pub description: String,
}

impl CourseRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Validate the form the way the course dialog does: both fields must be
    /// non-blank once surrounding whitespace is ignored.
    pub fn validate_form(&self) -> Result<(), AppError> {
        let trimmed = CourseRequest {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        trimmed.validate()?;
        Ok(())
    }
}

impl From<&Course> for CourseRequest {
    fn from(course: &Course) -> Self {
        CourseRequest {
            name: course.name.clone(),
            description: course.description.clone(),
        }
    }
}

/// Response of the create call. Depending on the backend version this is
/// either the bare new id or an object carrying it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CourseCreated {
    Id(i64),
    Record { id: i64 },
}

impl CourseCreated {
    pub fn id(&self) -> i64 {
        match self {
            CourseCreated::Id(id) => *id,
            CourseCreated::Record { id } => *id,
        }
    }

    /// Server-assigned ids are strictly positive.
    pub fn valid_id(&self) -> Option<i64> {
        Some(self.id()).filter(|id| *id > 0)
    }
}
