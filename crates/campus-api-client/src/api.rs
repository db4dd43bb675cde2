//! Domain methods for the course-management API.
//!
//! Courses live under `/course`, their materials under `/course-modules`, and
//! instructor and student accounts under `/user`.

use std::path::Path;

use bytes::Bytes;
use campus_core::models::{
    Course, CourseCreated, CourseRequest, LoginRequest, LoginResponse, Material, RegisterRequest,
    Role, SessionUser, User, UserRequest,
};
use campus_core::{content_type_for_filename, AppError};

use crate::ApiClient;

/// Multipart field name the backend expects for material uploads (repeatable).
pub const MATERIAL_FIELD: &str = "files";

/// A file ready to be sent in a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for_filename(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Read a file from the local disk.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Io(format!("Failed to read file {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("material")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl ApiClient {
    // ----- auth -----

    /// Log in and establish the session with the returned token and user.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AppError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post_json("/auth/login", &body).await?;
        self.session()
            .establish(response.token, response.user.clone())?;
        tracing::info!(role = %response.user.role, "Logged in");
        Ok(response.user)
    }

    /// Register a new student account. Does not log in.
    pub async fn register(&self, form: RegisterRequest) -> Result<(), AppError> {
        let request = UserRequest::from(form);
        request.validate_form(true)?;
        self.post("/user", &request).await
    }

    /// Forget the session locally. The backend keeps no session state.
    pub fn logout(&self) -> Result<(), AppError> {
        self.session().clear()
    }

    // ----- courses -----

    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        self.get("/course", &[]).await
    }

    pub async fn get_course(&self, course_id: i64) -> Result<Course, AppError> {
        self.get(&format!("/course/{}", course_id), &[]).await
    }

    /// Create a course and return the backend's response carrying the new id.
    pub async fn create_course(&self, request: &CourseRequest) -> Result<CourseCreated, AppError> {
        self.post_json("/course", request).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        request: &CourseRequest,
    ) -> Result<(), AppError> {
        self.put_json(&format!("/course/{}", course_id), request)
            .await
    }

    pub async fn delete_course(&self, course_id: i64) -> Result<(), AppError> {
        self.delete(&format!("/course/{}", course_id)).await
    }

    // ----- materials -----

    pub async fn list_materials(&self, course_id: i64) -> Result<Vec<Material>, AppError> {
        self.get(&format!("/course-modules/get/all/{}", course_id), &[])
            .await
    }

    /// Upload files as one multipart request attached to `course_id`.
    pub async fn upload_materials(
        &self,
        course_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<Material>, AppError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| {
                    AppError::InvalidInput(format!(
                        "Invalid content type '{}' for {}: {}",
                        file.content_type, file.file_name, e
                    ))
                })?;
            form = form.part(MATERIAL_FIELD, part);
        }

        self.post_multipart(&format!("/course-modules/{}", course_id), form)
            .await
    }

    pub async fn delete_material(&self, material_id: i64) -> Result<(), AppError> {
        self.delete(&format!("/course-modules/{}", material_id))
            .await
    }

    /// Delete every material of a course. Answers 404 when there is none.
    pub async fn delete_all_materials(&self, course_id: i64) -> Result<(), AppError> {
        self.delete(&format!("/course-modules/delete/all/{}", course_id))
            .await
    }

    /// Download a material's content.
    pub async fn download_material(&self, material_id: i64) -> Result<Bytes, AppError> {
        self.get_bytes(&format!("/course-modules/{}", material_id))
            .await
    }

    // ----- users -----

    /// List users, optionally restricted to one role.
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        let query: Vec<(&str, String)> = role
            .map(|r| vec![("role", r.as_str().to_string())])
            .unwrap_or_default();
        let mut users: Vec<User> = self.get("/user", &query).await?;
        if let Some(role) = role {
            users.retain(|u| u.role == role);
        }
        Ok(users)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, AppError> {
        self.get(&format!("/user/{}", user_id), &[]).await
    }

    pub async fn create_user(&self, request: &UserRequest) -> Result<(), AppError> {
        request.validate_form(true)?;
        self.post("/user", request).await
    }

    pub async fn update_user(&self, user_id: i64, request: &UserRequest) -> Result<(), AppError> {
        request.validate_form(false)?;
        self.put_json(&format!("/user/{}", user_id), request).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        self.delete(&format!("/user/{}", user_id)).await
    }
}
