//! Applies a confirmed course edit to the backend.
//!
//! The course fields are saved first. Material changes are only attempted once
//! that save succeeded, and their failures never undo it. Nothing is retried.

use campus_api_client::UploadFile;
use campus_core::models::{CourseRequest, Material};
use campus_core::{AppError, ErrorMetadata};
use futures::future::join_all;

use crate::backend::CourseBackend;
use crate::staging::StagingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    Create,
    Edit,
}

/// Failures that stop the commit before any material is touched.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("Course form is invalid: {0}")]
    Validation(#[source] AppError),

    #[error("Failed to save course: {0}")]
    EntitySave(#[source] AppError),

    #[error("Backend did not return a usable id for the new course")]
    MissingId,
}

impl CommitError {
    /// Message to show next to the form.
    pub fn user_message(&self) -> String {
        match self {
            CommitError::Validation(AppError::Validation(msg)) => msg.clone(),
            CommitError::Validation(e) | CommitError::EntitySave(e) => e.client_message(),
            CommitError::MissingId => "Course was not created.".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum UploadOutcome {
    /// Nothing was staged.
    Skipped,
    Uploaded(Vec<Material>),
    Failed(AppError),
}

impl UploadOutcome {
    pub fn uploaded_count(&self) -> usize {
        match self {
            UploadOutcome::Uploaded(materials) => materials.len(),
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UploadOutcome::Failed(_))
    }
}

/// Best-effort result of the material steps after a successful course save.
#[derive(Debug)]
pub struct CommitReport {
    pub mode: CommitMode,
    pub course_id: i64,
    pub deleted: Vec<i64>,
    pub deletion_failures: Vec<(i64, AppError)>,
    pub upload: UploadOutcome,
    pub refresh_failed: bool,
}

impl CommitReport {
    /// True when every staged material change reached the backend.
    pub fn is_complete(&self) -> bool {
        self.deletion_failures.is_empty() && !self.upload.is_failed()
    }

    pub fn summary(&self) -> String {
        let mut parts = vec![match self.mode {
            CommitMode::Create => format!("Course {} created", self.course_id),
            CommitMode::Edit => format!("Course {} updated", self.course_id),
        }];
        if !self.deleted.is_empty() {
            parts.push(format!("{} material(s) deleted", self.deleted.len()));
        }
        if !self.deletion_failures.is_empty() {
            parts.push(format!(
                "{} material deletion(s) failed",
                self.deletion_failures.len()
            ));
        }
        match &self.upload {
            UploadOutcome::Skipped => {}
            UploadOutcome::Uploaded(materials) => {
                parts.push(format!("{} material(s) uploaded", materials.len()))
            }
            UploadOutcome::Failed(_) => parts.push("material upload failed".to_string()),
        }
        parts.join("; ")
    }
}

pub struct CommitSequencer<'a, B: CourseBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: CourseBackend + ?Sized> CommitSequencer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Save the course held by `store` together with its staged material changes.
    ///
    /// On `Err` the store is left exactly as it was so the user can retry.
    /// On `Ok` the pending sets are cleared and the material list reflects
    /// what the backend reports after the changes.
    pub async fn commit(&self, store: &mut StagingStore) -> Result<CommitReport, CommitError> {
        let fields = store.fields();
        let request = CourseRequest::new(fields.name.trim(), fields.description.trim());
        request.validate_form().map_err(CommitError::Validation)?;

        match store.course().map(|c| c.id) {
            Some(course_id) => self.commit_edit(course_id, &request, store).await,
            None => self.commit_create(&request, store).await,
        }
    }

    async fn commit_edit(
        &self,
        course_id: i64,
        request: &CourseRequest,
        store: &mut StagingStore,
    ) -> Result<CommitReport, CommitError> {
        if let Err(e) = self.backend.update_course(course_id, request).await {
            tracing::warn!(course_id, error = %e, "Course update failed, staged changes kept");
            return Err(CommitError::EntitySave(e));
        }
        store.mark_saved(course_id, request);

        let deletions: Vec<i64> = store.pending_deletions().iter().copied().collect();
        let (deleted, deletion_failures) = self.delete_materials(&deletions).await;
        let upload = self.upload(course_id, &staged_files(store)).await;

        let refresh_failed = match self.backend.list_materials(course_id).await {
            Ok(materials) => {
                store.replace_materials(materials);
                false
            }
            Err(e) => {
                tracing::warn!(course_id, error = %e, "Material refresh failed, using local view");
                let mut local: Vec<Material> = store
                    .materials()
                    .iter()
                    .filter(|m| m.id.map_or(true, |id| !deleted.contains(&id)))
                    .cloned()
                    .collect();
                if let UploadOutcome::Uploaded(uploaded) = &upload {
                    local.extend(uploaded.iter().cloned());
                }
                store.replace_materials(local);
                true
            }
        };
        store.clear_pending();

        let report = CommitReport {
            mode: CommitMode::Edit,
            course_id,
            deleted,
            deletion_failures,
            upload,
            refresh_failed,
        };
        tracing::info!(
            course_id,
            deleted = report.deleted.len(),
            failed_deletions = report.deletion_failures.len(),
            uploaded = report.upload.uploaded_count(),
            "Course changes committed"
        );
        Ok(report)
    }

    async fn commit_create(
        &self,
        request: &CourseRequest,
        store: &mut StagingStore,
    ) -> Result<CommitReport, CommitError> {
        let created = match self.backend.create_course(request).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, "Course creation failed, nothing uploaded");
                return Err(CommitError::EntitySave(e));
            }
        };
        let Some(course_id) = created.valid_id() else {
            tracing::warn!(returned_id = created.id(), "Create response carried no valid id");
            return Err(CommitError::MissingId);
        };
        store.mark_saved(course_id, request);

        let upload = self.upload(course_id, &staged_files(store)).await;
        if let UploadOutcome::Uploaded(uploaded) = &upload {
            store.replace_materials(uploaded.clone());
        }
        store.clear_pending();

        tracing::info!(
            course_id,
            uploaded = upload.uploaded_count(),
            "Course created"
        );
        Ok(CommitReport {
            mode: CommitMode::Create,
            course_id,
            deleted: Vec::new(),
            deletion_failures: Vec::new(),
            upload,
            refresh_failed: false,
        })
    }

    /// Issue every deletion concurrently; one failure does not stop the others.
    async fn delete_materials(&self, ids: &[i64]) -> (Vec<i64>, Vec<(i64, AppError)>) {
        let results = join_all(ids.iter().map(|&id| async move {
            (id, self.backend.delete_material(id).await)
        }))
        .await;

        let mut deleted = Vec::new();
        let mut failures = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => deleted.push(id),
                Err(e) => {
                    tracing::warn!(material_id = id, error = %e, "Material deletion failed");
                    failures.push((id, e));
                }
            }
        }
        (deleted, failures)
    }

    async fn upload(&self, course_id: i64, files: &[UploadFile]) -> UploadOutcome {
        if files.is_empty() {
            return UploadOutcome::Skipped;
        }
        match self.backend.upload_materials(course_id, files).await {
            Ok(materials) => UploadOutcome::Uploaded(materials),
            Err(e) => {
                tracing::warn!(course_id, files = files.len(), error = %e, "Material upload failed");
                UploadOutcome::Failed(e)
            }
        }
    }
}

fn staged_files(store: &StagingStore) -> Vec<UploadFile> {
    store
        .pending_additions()
        .iter()
        .map(|p| p.file.clone())
        .collect()
}
