//! Lifecycle of the course create/edit dialog.
//!
//! Every open re-initializes the staging store, so nothing staged in a
//! previous session can surface against another course. Closing without
//! confirming rolls back to the opening snapshot and never calls the backend.

use std::sync::Arc;

use campus_core::models::{Course, Material};

use crate::backend::CourseBackend;
use crate::commit::{CommitError, CommitReport, CommitSequencer};
use crate::staging::StagingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Creating,
    Editing(i64),
}

/// Identifies one opening of the dialog. Results that arrive for an older
/// ticket belong to a closed session and must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    /// The dialog opened; move focus to its first input.
    FocusFirstField,
    /// The dialog closed; give focus back to whatever opened it.
    RestoreFocus,
}

pub trait FocusSink: Send + Sync {
    fn focus(&self, event: FocusEvent);
}

/// Focus sink for surfaces without focus handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFocus;

impl FocusSink for NoFocus {
    fn focus(&self, _event: FocusEvent) {}
}

pub struct EditSession {
    store: StagingStore,
    state: DialogState,
    generation: u64,
    focus: Arc<dyn FocusSink>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(Arc::new(NoFocus))
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("store", &self.store)
            .finish()
    }
}

impl EditSession {
    pub fn new(focus: Arc<dyn FocusSink>) -> Self {
        Self {
            store: StagingStore::new(),
            state: DialogState::Closed,
            generation: 0,
            focus,
        }
    }

    /// Open the dialog for a new course.
    pub fn open_create(&mut self) -> SessionTicket {
        self.open(None, Vec::new(), DialogState::Creating)
    }

    /// Open the dialog for `course` with its already fetched materials.
    pub fn open_edit(&mut self, course: &Course, materials: Vec<Material>) -> SessionTicket {
        self.open(Some(course), materials, DialogState::Editing(course.id))
    }

    /// Open the dialog for `course` before its materials are known.
    /// Deliver them later through [`EditSession::materials_loaded`].
    pub fn begin_edit(&mut self, course: &Course) -> SessionTicket {
        self.open_edit(course, Vec::new())
    }

    /// Apply a material list fetched for the session identified by `ticket`.
    /// Returns false and changes nothing when that session is no longer open.
    pub fn materials_loaded(&mut self, ticket: SessionTicket, materials: Vec<Material>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, current = self.generation, "Dropping stale material list");
            return false;
        }
        self.store.replace_materials(materials);
        true
    }

    /// Close without saving. Fields and materials return to their state at
    /// open time and all staged changes are discarded.
    pub fn cancel(&mut self) {
        if self.state == DialogState::Closed {
            return;
        }
        self.store.reset();
        self.close();
    }

    /// Validate and save. The dialog closes on success and stays open with
    /// everything staged when the course itself could not be saved.
    pub async fn confirm<B>(&mut self, backend: &B) -> Result<CommitReport, CommitError>
    where
        B: CourseBackend + ?Sized,
    {
        let report = CommitSequencer::new(backend)
            .commit(&mut self.store)
            .await?;
        self.close();
        Ok(report)
    }

    pub fn is_current(&self, ticket: SessionTicket) -> bool {
        self.state != DialogState::Closed && ticket.0 == self.generation
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != DialogState::Closed
    }

    pub fn store(&self) -> &StagingStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StagingStore {
        &mut self.store
    }

    fn open(
        &mut self,
        course: Option<&Course>,
        materials: Vec<Material>,
        state: DialogState,
    ) -> SessionTicket {
        self.generation += 1;
        self.store.initialize(course, materials);
        self.state = state;
        self.focus.focus(FocusEvent::FocusFirstField);
        SessionTicket(self.generation)
    }

    fn close(&mut self) {
        self.generation += 1;
        self.state = DialogState::Closed;
        self.focus.focus(FocusEvent::RestoreFocus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{course, existing_materials, file, Call, FakeBackend};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFocus(Mutex<Vec<FocusEvent>>);

    impl FocusSink for RecordingFocus {
        fn focus(&self, event: FocusEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn staged_session() -> EditSession {
        let mut session = EditSession::default();
        session.open_edit(&course(7), existing_materials());
        session.store_mut().stage_deletion(2);
        session.store_mut().stage_addition(file("c.pdf"));
        session
    }

    #[test]
    fn test_cancel_restores_materials_without_calls() {
        let backend = FakeBackend::new();
        let mut session = staged_session();
        session.store_mut().set_name("Edited");

        session.cancel();

        assert!(!session.is_open());
        assert_eq!(session.store().materials(), existing_materials().as_slice());
        assert!(!session.store().has_pending_changes());
        assert_eq!(session.store().fields().name, "Course 7");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_applies_staged_changes_and_closes() {
        let backend = FakeBackend::new().with_materials(7, existing_materials());
        let mut session = staged_session();

        let report = session.confirm(&backend).await.unwrap();

        assert!(report.is_complete());
        assert!(!session.is_open());
        assert_eq!(backend.count(|c| *c == Call::DeleteMaterial(2)), 1);
        assert_eq!(
            backend.count(|c| *c == Call::Upload(7, vec!["c.pdf".to_string()])),
            1
        );
        assert_eq!(backend.count(|c| *c == Call::List(7)), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_dialog_open() {
        let mut backend = FakeBackend::new();
        backend.fail_update = Some(403);
        let mut session = staged_session();

        let err = session.confirm(&backend).await.unwrap_err();

        assert!(matches!(err, CommitError::EntitySave(_)));
        assert_eq!(session.state(), DialogState::Editing(7));
        assert!(session.store().is_pending_deletion(2));
    }

    #[test]
    fn test_reopen_for_other_course_starts_clean() {
        let mut session = staged_session();
        session.cancel();
        session.open_edit(&course(8), vec![Material::persisted(2, "other.pdf")]);

        assert!(!session.store().is_pending_deletion(2));
        assert!(session.store().pending_additions().is_empty());
        assert_eq!(session.state(), DialogState::Editing(8));
    }

    #[test]
    fn test_late_materials_for_closed_session_are_dropped() {
        let mut session = EditSession::default();
        let first = session.begin_edit(&course(7));
        session.cancel();
        let second = session.begin_edit(&course(8));

        assert!(!session.materials_loaded(first, existing_materials()));
        assert!(session.store().materials().is_empty());

        assert!(session.materials_loaded(second, vec![Material::persisted(5, "e.pdf")]));
        assert_eq!(session.store().materials().len(), 1);
        assert!(session.store_mut().stage_deletion(5));
    }

    #[test]
    fn test_focus_moves_on_open_and_close() {
        let focus = Arc::new(RecordingFocus::default());
        let mut session = EditSession::new(focus.clone());

        session.open_create();
        session.cancel();
        // closing twice does not emit again
        session.cancel();

        assert_eq!(
            *focus.0.lock().unwrap(),
            vec![FocusEvent::FocusFirstField, FocusEvent::RestoreFocus]
        );
    }
}
