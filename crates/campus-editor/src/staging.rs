//! Staging store for the course edit dialog.
//!
//! Holds the in-progress course fields plus staged material changes without
//! touching the backend. Pending deletions always refer to materials of the
//! last fetched list; pending additions carry client-side temporary ids that
//! are never sent to the backend.

use std::collections::BTreeSet;
use std::fmt;

use campus_api_client::UploadFile;
use campus_core::models::{Course, CourseRequest, Material};
use chrono::{DateTime, Utc};

/// Client-side identifier of a pending addition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(String);

impl TempId {
    fn generate(counter: u64) -> Self {
        TempId(format!("tmp-{}-{:08x}", counter, rand::random::<u32>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chosen file waiting for the commit to upload it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAddition {
    pub temp_id: TempId,
    pub file: UploadFile,
    pub staged_at: DateTime<Utc>,
}

impl PendingAddition {
    pub fn display_name(&self) -> &str {
        &self.file.file_name
    }

    pub fn size(&self) -> u64 {
        self.file.size()
    }

    pub fn content_type(&self) -> &str {
        &self.file.content_type
    }
}

/// One row of the material list as the dialog renders it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialRow<'a> {
    /// Persisted material; `pending_deletion` rows render struck through
    /// with a "will be deleted" label.
    Existing {
        material: &'a Material,
        pending_deletion: bool,
    },
    /// Staged file, rendered with a "pending upload" badge.
    Addition(&'a PendingAddition),
}

#[derive(Debug, Default)]
pub struct StagingStore {
    course: Option<Course>,
    baseline_fields: CourseRequest,
    fields: CourseRequest,
    baseline: Vec<Material>,
    materials: Vec<Material>,
    additions: Vec<PendingAddition>,
    deletions: BTreeSet<i64>,
    next_temp: u64,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new editing session. `course` is `None` when creating.
    ///
    /// Snapshots `existing` as both the working list and the rollback
    /// baseline and drops anything staged by a previous session.
    pub fn initialize(&mut self, course: Option<&Course>, existing: Vec<Material>) {
        let fields = course.map(CourseRequest::from).unwrap_or_default();
        self.course = course.cloned();
        self.baseline_fields = fields.clone();
        self.fields = fields;
        self.baseline = existing.clone();
        self.materials = existing;
        self.additions.clear();
        self.deletions.clear();
    }

    /// Stage a file for upload and return its temporary id.
    pub fn stage_addition(&mut self, file: UploadFile) -> TempId {
        self.next_temp += 1;
        let mut temp_id = TempId::generate(self.next_temp);
        while self.additions.iter().any(|a| a.temp_id == temp_id) {
            temp_id = TempId::generate(self.next_temp);
        }
        tracing::debug!(temp_id = %temp_id, file = %file.file_name, "Staged material upload");
        self.additions.push(PendingAddition {
            temp_id: temp_id.clone(),
            file,
            staged_at: Utc::now(),
        });
        temp_id
    }

    /// Drop a staged file. Returns false when no such addition exists.
    pub fn unstage_addition(&mut self, temp_id: &TempId) -> bool {
        let before = self.additions.len();
        self.additions.retain(|a| &a.temp_id != temp_id);
        self.additions.len() != before
    }

    /// Mark an existing material for deletion.
    ///
    /// Only ids from the last fetched list can be staged; anything else is
    /// ignored and reported with `false`. Staging twice is harmless.
    pub fn stage_deletion(&mut self, material_id: i64) -> bool {
        if !self
            .materials
            .iter()
            .any(|m| m.id == Some(material_id))
        {
            tracing::debug!(material_id, "Ignoring deletion of unknown material");
            return false;
        }
        self.deletions.insert(material_id);
        true
    }

    /// Restore a material previously marked for deletion.
    pub fn unstage_deletion(&mut self, material_id: i64) -> bool {
        self.deletions.remove(&material_id)
    }

    /// Roll everything back to the state captured by `initialize`.
    pub fn reset(&mut self) {
        self.fields = self.baseline_fields.clone();
        self.materials = self.baseline.clone();
        self.additions.clear();
        self.deletions.clear();
    }

    /// Take a freshly fetched material list as the new working list and
    /// baseline. Pending deletions of materials that vanished are dropped.
    pub fn replace_materials(&mut self, materials: Vec<Material>) {
        self.deletions
            .retain(|id| materials.iter().any(|m| m.id == Some(*id)));
        self.baseline = materials.clone();
        self.materials = materials;
    }

    /// Forget the staged additions and deletions, keeping the field edits.
    pub fn clear_pending(&mut self) {
        self.additions.clear();
        self.deletions.clear();
    }

    /// Record that the course now exists server-side under `course_id`, with
    /// the fields the backend accepted as the new baseline.
    pub(crate) fn mark_saved(&mut self, course_id: i64, saved: &CourseRequest) {
        let course = Course {
            id: course_id,
            name: saved.name.clone(),
            description: saved.description.clone(),
            instructor_id: self.course.as_ref().and_then(|c| c.instructor_id),
            created_at: self.course.as_ref().and_then(|c| c.created_at),
        };
        self.fields = saved.clone();
        self.baseline_fields = saved.clone();
        self.course = Some(course);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.fields.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.fields.description = description.into();
    }

    pub fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    pub fn fields(&self) -> &CourseRequest {
        &self.fields
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn pending_additions(&self) -> &[PendingAddition] {
        &self.additions
    }

    pub fn pending_deletions(&self) -> &BTreeSet<i64> {
        &self.deletions
    }

    pub fn is_pending_deletion(&self, material_id: i64) -> bool {
        self.deletions.contains(&material_id)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.additions.is_empty() || !self.deletions.is_empty()
    }

    pub fn fields_changed(&self) -> bool {
        self.fields != self.baseline_fields
    }

    /// Rows to render: existing materials first, then staged uploads.
    pub fn rows(&self) -> Vec<MaterialRow<'_>> {
        self.materials
            .iter()
            .map(|material| MaterialRow::Existing {
                material,
                pending_deletion: material
                    .id
                    .map(|id| self.deletions.contains(&id))
                    .unwrap_or(false),
            })
            .chain(self.additions.iter().map(MaterialRow::Addition))
            .collect()
    }

    /// Total bytes waiting to be uploaded.
    pub fn pending_upload_bytes(&self) -> u64 {
        self.additions.iter().map(PendingAddition::size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{course, existing_materials, file};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn initialized() -> StagingStore {
        let mut store = StagingStore::new();
        store.initialize(Some(&course(7)), existing_materials());
        store
    }

    #[test]
    fn test_initialize_snapshots_fields_and_materials() {
        let store = initialized();
        assert_eq!(store.fields().name, "Course 7");
        assert_eq!(store.materials(), existing_materials().as_slice());
        assert!(!store.has_pending_changes());
        assert!(!store.fields_changed());
    }

    #[test]
    fn test_additions_keep_exactly_the_unstaged_complement() {
        let mut store = initialized();
        let a = store.stage_addition(file("a.txt"));
        let b = store.stage_addition(file("b.txt"));
        let c = store.stage_addition(file("c.txt"));
        assert!(store.unstage_addition(&b));
        assert!(!store.unstage_addition(&b));

        let names: Vec<&str> = store
            .pending_additions()
            .iter()
            .map(|p| p.display_name())
            .collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_temp_ids_unique_for_same_file_staged_repeatedly() {
        let mut store = initialized();
        let ids: HashSet<TempId> = (0..200)
            .map(|_| store.stage_addition(file("same.pdf")))
            .collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| id.as_str().starts_with("tmp-")));
    }

    #[test]
    fn test_deletion_stage_and_restore_in_order() {
        let mut store = initialized();
        assert!(store.stage_deletion(2));
        assert!(store.stage_deletion(2));
        assert!(store.is_pending_deletion(2));

        assert!(store.unstage_deletion(2));
        assert!(!store.is_pending_deletion(2));

        // restoring something never staged is a no-op
        assert!(!store.unstage_deletion(1));
        assert!(store.pending_deletions().is_empty());
    }

    #[test]
    fn test_deletion_limited_to_fetched_materials() {
        let mut store = initialized();
        assert!(!store.stage_deletion(99));
        assert!(store.pending_deletions().is_empty());
    }

    #[test]
    fn test_reset_restores_initialize_snapshot() {
        let mut store = initialized();
        store.set_name("Renamed");
        store.stage_deletion(2);
        store.stage_addition(file("c.pdf"));
        store.replace_materials(vec![Material::persisted(1, "a.pdf")]);

        store.reset();
        // replace_materials moved the baseline, so reset returns to it
        assert_eq!(store.materials(), &[Material::persisted(1, "a.pdf")]);

        store.initialize(Some(&course(7)), existing_materials());
        store.set_name("Renamed");
        store.stage_deletion(2);
        store.stage_addition(file("c.pdf"));
        store.reset();
        assert_eq!(store.materials(), existing_materials().as_slice());
        assert_eq!(store.fields().name, "Course 7");
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_reinitialize_drops_previous_session_state() {
        let mut store = initialized();
        store.stage_deletion(1);
        store.stage_addition(file("old.pdf"));

        let mut other = course(8);
        other.name = "Other".to_string();
        store.initialize(Some(&other), vec![Material::persisted(1, "x.pdf")]);

        assert!(store.pending_additions().is_empty());
        assert!(!store.is_pending_deletion(1));
        assert_eq!(store.fields().name, "Other");
    }

    #[test]
    fn test_rows_mark_pending_states() {
        let mut store = initialized();
        store.stage_deletion(2);
        store.stage_addition(file("c.pdf"));

        let rows = store.rows();
        assert_eq!(rows.len(), 3);
        assert!(matches!(
            rows[0],
            MaterialRow::Existing { pending_deletion: false, .. }
        ));
        assert!(matches!(
            rows[1],
            MaterialRow::Existing { pending_deletion: true, .. }
        ));
        assert!(matches!(rows[2], MaterialRow::Addition(p) if p.display_name() == "c.pdf"));
    }

    #[test]
    fn test_replace_materials_prunes_vanished_deletions() {
        let mut store = initialized();
        store.stage_deletion(1);
        store.stage_deletion(2);
        store.replace_materials(vec![Material::persisted(2, "b.pdf")]);
        assert_eq!(store.pending_deletions().iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_random_sequences_match_model() {
        for seed in 0..64u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut store = initialized();
            let mut added: Vec<(TempId, String)> = Vec::new();
            let mut deleted: BTreeSet<i64> = BTreeSet::new();

            for step in 0..rng.random_range(1..60) {
                match rng.random_range(0..4) {
                    0 => {
                        let name = format!("f{}.pdf", rng.random_range(0..5));
                        let id = store.stage_addition(file(&name));
                        added.push((id, name));
                    }
                    1 if !added.is_empty() => {
                        let (id, _) = added.remove(rng.random_range(0..added.len()));
                        assert!(store.unstage_addition(&id), "seed {seed} step {step}");
                        assert!(!store.unstage_addition(&id), "seed {seed} step {step}");
                    }
                    2 => {
                        // 3 is never a fetched material id
                        let id = rng.random_range(1..=3);
                        let staged = store.stage_deletion(id);
                        assert_eq!(staged, id != 3, "seed {seed} step {step}");
                        if staged {
                            deleted.insert(id);
                        }
                    }
                    _ => {
                        let id = rng.random_range(1..=3);
                        assert_eq!(
                            store.unstage_deletion(id),
                            deleted.remove(&id),
                            "seed {seed} step {step}"
                        );
                    }
                }
            }

            let staged: Vec<(TempId, String)> = store
                .pending_additions()
                .iter()
                .map(|p| (p.temp_id.clone(), p.display_name().to_string()))
                .collect();
            assert_eq!(staged, added, "seed {seed}");
            let unique: HashSet<&TempId> = staged.iter().map(|(id, _)| id).collect();
            assert_eq!(unique.len(), staged.len(), "seed {seed}");
            assert_eq!(store.pending_deletions(), &deleted, "seed {seed}");

            store.reset();
            assert_eq!(store.materials(), existing_materials().as_slice(), "seed {seed}");
            assert!(!store.has_pending_changes(), "seed {seed}");
        }
    }
}
