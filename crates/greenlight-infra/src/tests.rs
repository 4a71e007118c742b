//! End-to-end checks wiring the workflow engine to the real adapters.

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use greenlight_core::domain::{Capabilities, Platform, PostStatus, Session, UserRef};
use greenlight_core::ports::{FileStore, PostRepository};
use greenlight_core::workflow::NewPost;
use greenlight_core::Workflow;

use crate::files::DEFAULT_MAX_BYTES;
use crate::{DiskFileStore, InMemoryPostRepository};

fn session(uid: &str, admin: bool) -> Session {
    Session {
        user: UserRef {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
        },
        caps: Capabilities {
            editor: true,
            admin,
        },
    }
}

fn harness() -> (TempDir, Workflow, Arc<DiskFileStore>) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DiskFileStore::new(dir.path(), DEFAULT_MAX_BYTES));
    let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new());
    let workflow = Workflow::new(posts, store.clone());
    (dir, workflow, store)
}

async fn upload(
    workflow: &Workflow,
    store: &DiskFileStore,
    session: &Session,
    post_id: uuid::Uuid,
    name: &str,
    bytes: &[u8],
) {
    let staged = store.stage(bytes, name).await.unwrap();
    let stored = store
        .commit(staged, &post_id.to_string(), Some(name))
        .await
        .unwrap();
    workflow
        .attach_file(
            session,
            post_id,
            greenlight_core::domain::FileRef {
                filename: stored.filename,
                original_name: name.to_string(),
                content_type: "image/jpeg".to_string(),
                size: bytes.len() as u64,
                uploaded_at: Utc::now(),
            },
        )
        .await
        .unwrap();
}

fn draft() -> NewPost {
    NewPost {
        title: "Weekend preview".to_string(),
        content: "Clips from the fair".to_string(),
        scheduled_date: Utc::now(),
        platforms: vec![Platform::Instagram],
        link: None,
    }
}

#[tokio::test]
async fn mark_posted_empties_the_post_directory() {
    let (_guard, workflow, store) = harness();
    let editor = session("editor-1", false);
    let admin = session("admin-1", true);

    let post = workflow.create(&editor, draft()).await.unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        upload(&workflow, &store, &editor, post.id, name, b"bytes").await;
    }
    let post_dir = store.root().join(post.id.to_string());
    assert!(post_dir.exists());

    workflow.approve(&admin, post.id).await.unwrap();
    let (post, report) = workflow.mark_posted(&admin, post.id).await.unwrap();

    assert_eq!(post.status, PostStatus::Posted);
    assert_eq!(post.posted_by.as_ref().unwrap().uid, "admin-1");
    assert!(post.posted_at.is_some());
    assert_eq!(report.attempted, 3);
    assert!(!report.is_partial());
    // Every artifact purged and the directory itself removed; the files
    // metadata survives for display.
    assert!(!post_dir.exists());
    assert_eq!(post.files.len(), 3);
}

#[tokio::test]
async fn mark_posted_without_files_needs_no_directory() {
    let (_guard, workflow, _store) = harness();
    let editor = session("editor-1", false);
    let admin = session("admin-1", true);

    let post = workflow.create(&editor, draft()).await.unwrap();
    workflow.approve(&admin, post.id).await.unwrap();
    let (post, report) = workflow.mark_posted(&admin, post.id).await.unwrap();

    assert_eq!(post.status, PostStatus::Posted);
    assert_eq!(report.attempted, 0);
}

#[tokio::test]
async fn deleting_a_post_removes_files_and_record() {
    let (_guard, workflow, store) = harness();
    let editor = session("editor-1", false);

    let post = workflow.create(&editor, draft()).await.unwrap();
    upload(&workflow, &store, &editor, post.id, "only.jpg", b"bytes").await;
    let post_dir = store.root().join(post.id.to_string());

    let report = workflow.delete(&editor, post.id).await.unwrap();

    assert_eq!(report.attempted, 1);
    assert!(!post_dir.exists());
    assert!(workflow.get(post.id).await.is_err());
}

#[tokio::test]
async fn purge_tolerates_files_already_gone() {
    let (_guard, workflow, store) = harness();
    let editor = session("editor-1", false);
    let admin = session("admin-1", true);

    let post = workflow.create(&editor, draft()).await.unwrap();
    upload(&workflow, &store, &editor, post.id, "gone.jpg", b"bytes").await;

    // Someone deleted the artifact out from under the record.
    store
        .delete(&post.id.to_string(), "gone.jpg")
        .await
        .unwrap();

    workflow.approve(&admin, post.id).await.unwrap();
    let (post, report) = workflow.mark_posted(&admin, post.id).await.unwrap();

    assert_eq!(post.status, PostStatus::Posted);
    assert!(!report.is_partial());
}
