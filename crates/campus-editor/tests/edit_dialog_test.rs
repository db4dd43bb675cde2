//! Course edit dialog against a mocked backend.
//!
//! Run with: `cargo test -p campus-editor --test edit_dialog_test`

use std::sync::Arc;

use campus_api_client::{ApiClient, CollectingNotifier, SessionContext, UploadFile};
use campus_core::error::FORBIDDEN_MESSAGE;
use campus_core::models::{Course, Material};
use campus_editor::{delete_course_cascade, CommitError, EditSession, MaterialsCleanup};
use mockito::{Matcher, Server};

fn client(server: &Server) -> (ApiClient, Arc<CollectingNotifier>) {
    let notifier = Arc::new(CollectingNotifier::new());
    let client = ApiClient::new(server.url(), SessionContext::in_memory(), notifier.clone())
        .expect("client");
    (client, notifier)
}

fn course() -> Course {
    Course {
        id: 7,
        name: "Operating Systems".to_string(),
        description: "Processes and memory".to_string(),
        instructor_id: None,
        created_at: None,
    }
}

fn materials() -> Vec<Material> {
    vec![
        Material::persisted(1, "a.pdf"),
        Material::persisted(2, "b.pdf"),
    ]
}

/// Open the dialog, mark material 2 for deletion and stage c.pdf.
fn staged_session() -> EditSession {
    let mut session = EditSession::default();
    session.open_edit(&course(), materials());
    assert!(session.store_mut().stage_deletion(2));
    session
        .store_mut()
        .stage_addition(UploadFile::new("c.pdf", b"%PDF-1.4".to_vec()));
    session
}

#[tokio::test]
async fn test_cancel_leaves_list_unchanged_and_calls_nothing() {
    let mut server = Server::new_async().await;
    let update = server
        .mock("PUT", "/course/7")
        .expect(0)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/course-modules/2")
        .expect(0)
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/course-modules/7")
        .expect(0)
        .create_async()
        .await;

    let mut session = staged_session();
    session.cancel();

    let names: Vec<&str> = session
        .store()
        .materials()
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    assert!(!session.store().has_pending_changes());

    update.assert_async().await;
    delete.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_confirm_deletes_uploads_and_refreshes_once() {
    let mut server = Server::new_async().await;
    let update = server
        .mock("PUT", "/course/7")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "Operating Systems"
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/course-modules/2")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/course-modules/7")
        .match_body(Matcher::Regex(r#"filename="c.pdf""#.to_string()))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 3, "fileName": "c.pdf", "courseId": 7}]"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", "/course-modules/get/all/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 1, "fileName": "a.pdf"}, {"id": 3, "fileName": "c.pdf"}]"#)
        .expect(1)
        .create_async()
        .await;

    let (client, notifier) = client(&server);
    let mut session = staged_session();

    let report = session.confirm(&client).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.deleted, vec![2]);
    assert_eq!(report.upload.uploaded_count(), 1);
    assert!(!session.is_open());
    let ids: Vec<Option<i64>> = session.store().materials().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![Some(1), Some(3)]);
    assert!(notifier.drain().is_empty());

    update.assert_async().await;
    delete.assert_async().await;
    upload.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_forbidden_update_stops_before_materials() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/course/7")
        .with_status(403)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/course-modules/2")
        .expect(0)
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/course-modules/7")
        .expect(0)
        .create_async()
        .await;

    let (client, notifier) = client(&server);
    let mut session = staged_session();

    let err = session.confirm(&client).await.unwrap_err();

    assert!(matches!(err, CommitError::EntitySave(_)));
    assert_eq!(err.user_message(), FORBIDDEN_MESSAGE);
    assert_eq!(notifier.messages(), vec![FORBIDDEN_MESSAGE.to_string()]);
    assert!(session.is_open());
    assert!(session.store().is_pending_deletion(2));
    delete.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_course_delete_tolerates_missing_materials() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/course-modules/delete/all/7")
        .with_status(404)
        .create_async()
        .await;
    let delete_course = server
        .mock("DELETE", "/course/7")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let (client, _) = client(&server);
    let outcome = delete_course_cascade(&client, 7).await.unwrap();

    assert!(matches!(outcome.materials, MaterialsCleanup::NoneToDelete));
    delete_course.assert_async().await;
}
