use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Role;
use crate::error::AppError;

/// Student-specific profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<u32>,
}

/// Instructor-specific profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
}

/// User account (administrator, instructor or student)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<InstructorProfile>,
}

/// Request body for `POST /user` and `PUT /user/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Required when creating; omitted on edit to keep the current password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<InstructorProfile>,
}

impl UserRequest {
    /// Validate the request; `creating` additionally requires a password.
    pub fn validate_form(&self, creating: bool) -> Result<(), AppError> {
        let mut trimmed = self.clone();
        trimmed.name = self.name.trim().to_string();
        trimmed.email = self.email.trim().to_string();
        trimmed.validate()?;

        if creating && self.password.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        if let Some(student) = &self.student {
            student.validate()?;
        }
        Ok(())
    }
}

impl From<&User> for UserRequest {
    fn from(user: &User) -> Self {
        UserRequest {
            name: user.name.clone(),
            email: user.email.clone(),
            password: None,
            role: user.role,
            contact_number: user.contact_number,
            student: user.student.clone(),
            instructor: user.instructor.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_request() -> UserRequest {
        UserRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: Some("secret1".to_string()),
            role: Role::Student,
            contact_number: Some(771234567),
            student: Some(StudentProfile {
                address: Some("Colombo".to_string()),
                age: Some(21),
            }),
            instructor: None,
        }
    }

    #[test]
    fn test_user_request_serializes_camel_case() {
        let json = serde_json::to_value(student_request()).unwrap();
        assert_eq!(json["contactNumber"], 771234567);
        assert_eq!(json["role"], "Student");
        assert_eq!(json["student"]["age"], 21);
        assert!(json.get("instructor").is_none());
    }

    #[test]
    fn test_validate_form_requires_password_on_create() {
        let mut request = student_request();
        request.password = None;
        assert!(request.validate_form(false).is_ok());
        assert!(matches!(
            request.validate_form(true),
            Err(AppError::Validation(msg)) if msg == "Password is required"
        ));
    }

    #[test]
    fn test_validate_form_checks_email_and_age() {
        let mut request = student_request();
        request.email = "not-an-email".to_string();
        assert!(request.validate_form(true).is_err());

        let mut request = student_request();
        request.student = Some(StudentProfile {
            address: None,
            age: Some(0),
        });
        assert!(request.validate_form(true).is_err());
    }
}
