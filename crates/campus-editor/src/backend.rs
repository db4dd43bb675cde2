//! Backend operations the editing workflows depend on.

use async_trait::async_trait;
use campus_api_client::{ApiClient, UploadFile};
use campus_core::models::{CourseCreated, CourseRequest, Material};
use campus_core::AppError;

/// Course and material calls used by the commit sequencer and course deletion.
#[async_trait]
pub trait CourseBackend: Send + Sync {
    async fn create_course(&self, request: &CourseRequest) -> Result<CourseCreated, AppError>;

    async fn update_course(&self, course_id: i64, request: &CourseRequest)
        -> Result<(), AppError>;

    async fn delete_course(&self, course_id: i64) -> Result<(), AppError>;

    async fn list_materials(&self, course_id: i64) -> Result<Vec<Material>, AppError>;

    async fn upload_materials(
        &self,
        course_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<Material>, AppError>;

    async fn delete_material(&self, material_id: i64) -> Result<(), AppError>;

    async fn delete_all_materials(&self, course_id: i64) -> Result<(), AppError>;
}

#[async_trait]
impl CourseBackend for ApiClient {
    async fn create_course(&self, request: &CourseRequest) -> Result<CourseCreated, AppError> {
        ApiClient::create_course(self, request).await
    }

    async fn update_course(
        &self,
        course_id: i64,
        request: &CourseRequest,
    ) -> Result<(), AppError> {
        ApiClient::update_course(self, course_id, request).await
    }

    async fn delete_course(&self, course_id: i64) -> Result<(), AppError> {
        ApiClient::delete_course(self, course_id).await
    }

    async fn list_materials(&self, course_id: i64) -> Result<Vec<Material>, AppError> {
        ApiClient::list_materials(self, course_id).await
    }

    async fn upload_materials(
        &self,
        course_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<Material>, AppError> {
        ApiClient::upload_materials(self, course_id, files).await
    }

    async fn delete_material(&self, material_id: i64) -> Result<(), AppError> {
        ApiClient::delete_material(self, material_id).await
    }

    async fn delete_all_materials(&self, course_id: i64) -> Result<(), AppError> {
        ApiClient::delete_all_materials(self, course_id).await
    }
}
