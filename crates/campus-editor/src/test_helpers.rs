//! In-memory backend double that records every call.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use campus_api_client::UploadFile;
use campus_core::models::{Course, CourseCreated, CourseRequest, Material};
use campus_core::AppError;

use crate::backend::CourseBackend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Update(i64, String),
    DeleteCourse(i64),
    List(i64),
    Upload(i64, Vec<String>),
    DeleteMaterial(i64),
    DeleteAllMaterials(i64),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    materials: HashMap<i64, Vec<Material>>,
    next_material_id: i64,
}

/// Recording fake for `CourseBackend`. Failures are configured per operation
/// as the HTTP status the backend would answer with.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    pub created: Option<CourseCreated>,
    pub fail_create: Option<u16>,
    pub fail_update: Option<u16>,
    pub fail_delete_course: Option<u16>,
    pub fail_list: Option<u16>,
    pub fail_upload: Option<u16>,
    pub fail_delete_all: Option<u16>,
    pub failing_material_deletes: BTreeSet<i64>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            created: Some(CourseCreated::Id(42)),
            state: Mutex::new(State {
                next_material_id: 100,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn with_materials(self, course_id: i64, materials: Vec<Material>) -> Self {
        self.lock().materials.insert(course_id, materials);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }
}

fn replay(status: Option<u16>) -> Result<(), AppError> {
    match status {
        Some(status) => Err(AppError::from_status(status, None)),
        None => Ok(()),
    }
}

#[async_trait]
impl CourseBackend for FakeBackend {
    async fn create_course(&self, request: &CourseRequest) -> Result<CourseCreated, AppError> {
        self.record(Call::Create(request.name.clone()));
        replay(self.fail_create)?;
        self.created
            .clone()
            .ok_or_else(|| AppError::Serialization("empty create response".to_string()))
    }

    async fn update_course(&self, course_id: i64, request: &CourseRequest) -> Result<(), AppError> {
        self.record(Call::Update(course_id, request.name.clone()));
        replay(self.fail_update)
    }

    async fn delete_course(&self, course_id: i64) -> Result<(), AppError> {
        self.record(Call::DeleteCourse(course_id));
        replay(self.fail_delete_course)
    }

    async fn list_materials(&self, course_id: i64) -> Result<Vec<Material>, AppError> {
        self.record(Call::List(course_id));
        replay(self.fail_list)?;
        Ok(self
            .lock()
            .materials
            .get(&course_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_materials(
        &self,
        course_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<Material>, AppError> {
        self.record(Call::Upload(
            course_id,
            files.iter().map(|f| f.file_name.clone()).collect(),
        ));
        replay(self.fail_upload)?;

        let mut state = self.lock();
        let mut uploaded = Vec::with_capacity(files.len());
        for file in files {
            state.next_material_id += 1;
            let mut material = Material::persisted(state.next_material_id, file.file_name.clone());
            material.course_id = Some(course_id);
            uploaded.push(material);
        }
        state
            .materials
            .entry(course_id)
            .or_default()
            .extend(uploaded.iter().cloned());
        Ok(uploaded)
    }

    async fn delete_material(&self, material_id: i64) -> Result<(), AppError> {
        self.record(Call::DeleteMaterial(material_id));
        if self.failing_material_deletes.contains(&material_id) {
            return Err(AppError::from_status(500, None));
        }
        for materials in self.lock().materials.values_mut() {
            materials.retain(|m| m.id != Some(material_id));
        }
        Ok(())
    }

    async fn delete_all_materials(&self, course_id: i64) -> Result<(), AppError> {
        self.record(Call::DeleteAllMaterials(course_id));
        replay(self.fail_delete_all)?;
        self.lock().materials.remove(&course_id);
        Ok(())
    }
}

pub fn course(id: i64) -> Course {
    Course {
        id,
        name: format!("Course {}", id),
        description: "Intro material".to_string(),
        instructor_id: None,
        created_at: None,
    }
}

pub fn existing_materials() -> Vec<Material> {
    vec![
        Material::persisted(1, "a.pdf"),
        Material::persisted(2, "b.pdf"),
    ]
}

pub fn file(name: &str) -> UploadFile {
    UploadFile::new(name, name.as_bytes().to_vec())
}
