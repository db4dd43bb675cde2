use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Role, StudentProfile, UserRequest};

/// Request body for `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`: the bearer token plus the user record.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: SessionUser,
}

/// User object cached alongside the token for the lifetime of a session.
///
/// Only `role` is interpreted; every other field the backend returns is kept
/// verbatim so it can be shown on the profile screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Unknown user")
    }
}

/// Self-service registration form. Self-registered accounts are always students.
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub contact_number: Option<i64>,
    pub address: Option<String>,
    pub age: Option<u32>,
}

impl From<RegisterRequest> for UserRequest {
    fn from(form: RegisterRequest) -> Self {
        UserRequest {
            name: form.name,
            email: form.email,
            password: Some(form.password),
            role: Role::Student,
            contact_number: form.contact_number,
            student: Some(StudentProfile {
                address: form.address.filter(|a| !a.is_empty()),
                age: form.age,
            }),
            instructor: None,
        }
    }
}
