//! Course editing workflows
//!
//! The course edit dialog never talks to the backend while the user works:
//! new files and removals of existing materials are staged in a
//! [`StagingStore`], and only a confirmed submission runs the
//! [`CommitSequencer`], which saves the course first and then applies the
//! staged material changes best-effort. Cancelling discards everything staged.
//!
//! The crate also carries the smaller list-screen workflows: in-place delete
//! confirmation, course deletion with material cleanup, and the user form.

pub mod backend;
pub mod cascade;
pub mod commit;
pub mod delete_confirm;
pub mod dialog;
pub mod staging;
pub mod user_form;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use backend::CourseBackend;
pub use cascade::{delete_course_cascade, CascadeOutcome, MaterialsCleanup};
pub use commit::{CommitError, CommitMode, CommitReport, CommitSequencer, UploadOutcome};
pub use delete_confirm::{confirm_and_delete, remove_optimistically, DeleteConfirmation};
pub use dialog::{DialogState, EditSession, FocusEvent, FocusSink, NoFocus, SessionTicket};
pub use staging::{MaterialRow, PendingAddition, StagingStore, TempId};
pub use user_form::{UserField, UserForm};
