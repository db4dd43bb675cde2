//! Course deletion together with its materials.

use campus_core::AppError;

use crate::backend::CourseBackend;

/// What happened to the course's materials before the course was deleted.
#[derive(Debug)]
pub enum MaterialsCleanup {
    Deleted,
    /// The backend answered 404: the course had no materials.
    NoneToDelete,
    /// Cleanup failed; the course deletion was still attempted.
    Failed(AppError),
}

#[derive(Debug)]
pub struct CascadeOutcome {
    pub course_id: i64,
    pub materials: MaterialsCleanup,
}

impl CascadeOutcome {
    /// Materials may have been left behind on the backend.
    pub fn has_orphaned_materials(&self) -> bool {
        matches!(self.materials, MaterialsCleanup::Failed(_))
    }
}

/// Remove all materials of `course_id`, then the course itself.
///
/// A failed material cleanup is reported in the outcome but does not stop
/// the course deletion. Only the course deletion's own failure is an error.
pub async fn delete_course_cascade<B>(backend: &B, course_id: i64) -> Result<CascadeOutcome, AppError>
where
    B: CourseBackend + ?Sized,
{
    let materials = match backend.delete_all_materials(course_id).await {
        Ok(()) => MaterialsCleanup::Deleted,
        Err(e) if e.is_not_found() => {
            tracing::debug!(course_id, "Course had no materials to delete");
            MaterialsCleanup::NoneToDelete
        }
        Err(e) => {
            tracing::error!(course_id, error = %e, "Failed to delete course materials");
            MaterialsCleanup::Failed(e)
        }
    };

    backend.delete_course(course_id).await?;
    tracing::info!(course_id, "Course deleted");

    Ok(CascadeOutcome {
        course_id,
        materials,
    })
}
