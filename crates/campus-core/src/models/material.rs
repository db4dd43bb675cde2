use serde::{Deserialize, Serialize};

/// File attached to exactly one course ("course module" on the backend).
///
/// `id` is absent until the backend has persisted the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "fileName", alias = "originalName")]
    pub name: String,
    #[serde(default)]
    pub stored_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl Material {
    /// Material known to the backend with the given id and display name.
    pub fn persisted(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            stored_name: None,
            course_id: None,
            size: None,
            content_type: None,
        }
    }

    /// Name to save a downloaded copy under.
    pub fn download_name(&self) -> &str {
        if self.name.is_empty() {
            self.stored_name.as_deref().unwrap_or("material")
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_deserializes_backend_shape() {
        let material: Material = serde_json::from_str(
            r#"{"id": 5, "fileName": "week1.pdf", "storedName": "a1b2-week1.pdf", "courseId": 2}"#,
        )
        .unwrap();
        assert_eq!(material.id, Some(5));
        assert_eq!(material.name, "week1.pdf");
        assert_eq!(material.stored_name.as_deref(), Some("a1b2-week1.pdf"));
        assert_eq!(material.course_id, Some(2));
    }

    #[test]
    fn test_download_name_falls_back_to_stored_name() {
        let mut material = Material::persisted(1, "");
        material.stored_name = Some("stored.bin".to_string());
        assert_eq!(material.download_name(), "stored.bin");
        assert_eq!(Material::persisted(2, "a.pdf").download_name(), "a.pdf");
    }
}
