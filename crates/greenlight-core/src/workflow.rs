//! The post lifecycle engine: status transitions, permission checks, and
//! the file-deletion side effects tied to transitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::domain::{FileRef, Platform, Post, Session};
use crate::error::DomainError;
use crate::ports::{FileStore, FileStoreError, PostRepository};

/// How many file deletions a single purge issues concurrently.
const PURGE_CONCURRENCY: usize = 4;

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub scheduled_date: DateTime<Utc>,
    pub platforms: Vec<Platform>,
    pub link: Option<String>,
}

/// Field updates applied by an edit.
#[derive(Debug, Clone)]
pub struct PostEdit {
    pub title: String,
    pub content: String,
    pub scheduled_date: DateTime<Utc>,
}

/// One file that could not be deleted during a purge.
#[derive(Debug, Clone)]
pub struct PurgeFailure {
    pub filename: String,
    pub error: String,
}

/// Collected outcome of a best-effort batch file deletion.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    pub attempted: usize,
    pub failures: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("failed to delete {}: {}", f.filename, f.error))
            .collect()
    }
}

/// Orchestrates post transitions over the repository and file store ports.
///
/// Every operation takes an explicit [`Session`]; capability checks happen
/// here, on the normalized flags, never against raw role strings.
#[derive(Clone)]
pub struct Workflow {
    posts: Arc<dyn PostRepository>,
    files: Arc<dyn FileStore>,
}

impl Workflow {
    pub fn new(posts: Arc<dyn PostRepository>, files: Arc<dyn FileStore>) -> Self {
        Self { posts, files }
    }

    /// Create a pending post. Any authenticated editor may upload.
    pub async fn create(&self, session: &Session, draft: NewPost) -> Result<Post, DomainError> {
        if draft.title.trim().is_empty() {
            return Err(DomainError::Validation("title is required".to_string()));
        }
        if draft.content.trim().is_empty() {
            return Err(DomainError::Validation("content is required".to_string()));
        }
        if draft.platforms.is_empty() {
            return Err(DomainError::Validation(
                "at least one platform is required".to_string(),
            ));
        }

        let post = Post::new(
            session.user.clone(),
            draft.title,
            draft.content,
            draft.scheduled_date,
            draft.platforms,
            draft.link,
        );
        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, uploaded_by = %post.uploaded_by.email, "post created");
        Ok(post)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "post",
                id,
            })
    }

    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list().await?)
    }

    /// Apply field edits, appending a human-readable diff summary to the
    /// edit history. Editing a `changes_requested` post resubmits it.
    pub async fn edit(
        &self,
        session: &Session,
        id: Uuid,
        edit: PostEdit,
    ) -> Result<Post, DomainError> {
        let mut post = self.get(id).await?;
        if !post.editable_by(session) {
            return Err(DomainError::Forbidden("edit this post"));
        }

        let mut changes = Vec::new();
        if edit.title != post.title {
            changes.push(format!("Title: \"{}\" -> \"{}\"", post.title, edit.title));
        }
        if edit.content != post.content {
            changes.push("Content changed".to_string());
        }
        if edit.scheduled_date != post.scheduled_date {
            changes.push("Scheduled date changed".to_string());
        }

        post.title = edit.title;
        post.content = edit.content;
        post.scheduled_date = edit.scheduled_date;
        post.record_edit(&session.user, changes.join("; "));

        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, editor = %session.user.email, "post edited");
        Ok(post)
    }

    /// Admin approval: `pending -> authorized`.
    pub async fn approve(&self, session: &Session, id: Uuid) -> Result<Post, DomainError> {
        if !session.is_admin() {
            return Err(DomainError::Forbidden("approve posts"));
        }
        let mut post = self.get(id).await?;
        post.approve(&session.user)?;
        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, admin = %session.user.email, "post approved");
        Ok(post)
    }

    /// Admin change request: `pending -> changes_requested`.
    pub async fn request_changes(
        &self,
        session: &Session,
        id: Uuid,
        message: String,
    ) -> Result<Post, DomainError> {
        if !session.is_admin() {
            return Err(DomainError::Forbidden("request changes"));
        }
        if message.trim().is_empty() {
            return Err(DomainError::Validation(
                "a change request needs a message".to_string(),
            ));
        }
        let mut post = self.get(id).await?;
        post.request_changes(&session.user, message)?;
        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, admin = %session.user.email, "changes requested");
        Ok(post)
    }

    /// Admin publish: `authorized -> posted`, purging the post's files
    /// first. The status transition proceeds regardless of individual
    /// deletion failures; those are reported back as warnings.
    pub async fn mark_posted(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<(Post, PurgeReport), DomainError> {
        if !session.is_admin() {
            return Err(DomainError::Forbidden("mark posts as posted"));
        }
        let mut post = self.get(id).await?;
        // Reject the transition up front so files survive an invalid call.
        if post.status != crate::domain::PostStatus::Authorized {
            return Err(DomainError::InvalidTransition {
                from: post.status,
                action: "mark as posted",
            });
        }

        let report = self.purge_files(&post).await;
        post.mark_posted(&session.user)?;
        let post = self.posts.save(post).await?;
        tracing::info!(
            post_id = %post.id,
            admin = %session.user.email,
            purged = report.attempted,
            failed = report.failures.len(),
            "post marked as posted"
        );
        Ok((post, report))
    }

    /// Delete a post and all of its files. Owner or admin.
    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<PurgeReport, DomainError> {
        let post = self.get(id).await?;
        if !post.deletable_by(session) {
            return Err(DomainError::Forbidden("delete this post"));
        }

        let report = self.purge_files(&post).await;
        self.posts.delete(id).await?;
        tracing::info!(
            post_id = %id,
            by = %session.user.email,
            purged = report.attempted,
            failed = report.failures.len(),
            "post deleted"
        );
        Ok(report)
    }

    /// Record a committed upload on the post. Owner or admin.
    pub async fn attach_file(
        &self,
        session: &Session,
        post_id: Uuid,
        file: FileRef,
    ) -> Result<Post, DomainError> {
        let mut post = self.get(post_id).await?;
        if !post.editable_by(session) {
            return Err(DomainError::Forbidden("attach files to this post"));
        }
        post.files.retain(|f| f.filename != file.filename);
        post.files.push(file);
        Ok(self.posts.save(post).await?)
    }

    /// Drop a file's metadata after it was deleted from disk.
    pub async fn detach_file(
        &self,
        session: &Session,
        post_id: Uuid,
        filename: &str,
    ) -> Result<Post, DomainError> {
        let mut post = self.get(post_id).await?;
        if !post.editable_by(session) {
            return Err(DomainError::Forbidden("detach files from this post"));
        }
        post.files.retain(|f| f.filename != filename);
        Ok(self.posts.save(post).await?)
    }

    /// Best-effort batch deletion of a post's files: bounded fan-out, one
    /// outcome per file, never aborting on individual failures. A file
    /// already absent counts as deleted.
    async fn purge_files(&self, post: &Post) -> PurgeReport {
        let post_id = post.id.to_string();
        let results: Vec<(String, Result<(), FileStoreError>)> =
            stream::iter(post.files.clone())
                .map(|file| {
                    let store = Arc::clone(&self.files);
                    let post_id = post_id.clone();
                    async move {
                        let result = store.delete(&post_id, &file.filename).await;
                        (file.filename, result)
                    }
                })
                .buffer_unordered(PURGE_CONCURRENCY)
                .collect()
                .await;

        let mut report = PurgeReport {
            attempted: results.len(),
            failures: Vec::new(),
        };
        for (filename, result) in results {
            match result {
                Ok(()) => {}
                Err(FileStoreError::NotFound) => {
                    tracing::debug!(post_id = %post.id, %filename, "file already absent during purge");
                }
                Err(err) => {
                    tracing::warn!(post_id = %post.id, %filename, error = %err, "purge deletion failed");
                    report.failures.push(PurgeFailure {
                        filename,
                        error: err.to_string(),
                    });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Capabilities, PostStatus, UserRef};
    use crate::error::RepoError;
    use crate::ports::{RetrievedFile, StagedUpload, StoredFile};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::sync::Mutex;

    struct MemRepo {
        store: Mutex<HashMap<Uuid, Post>>,
    }

    impl MemRepo {
        fn new() -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl PostRepository for MemRepo {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.store.lock().unwrap().get(&id).cloned())
        }

        async fn list(&self) -> Result<Vec<Post>, RepoError> {
            Ok(self.store.lock().unwrap().values().cloned().collect())
        }

        async fn save(&self, post: Post) -> Result<Post, RepoError> {
            self.store.lock().unwrap().insert(post.id, post.clone());
            Ok(post)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.store.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    /// File store double tracking deletions, with injectable failures.
    struct FakeFiles {
        deleted: Mutex<Vec<String>>,
        failing: HashSet<String>,
    }

    impl FakeFiles {
        fn new() -> Self {
            Self {
                deleted: Mutex::new(Vec::new()),
                failing: HashSet::new(),
            }
        }

        fn failing_on(filenames: &[&str]) -> Self {
            Self {
                deleted: Mutex::new(Vec::new()),
                failing: filenames.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl FileStore for FakeFiles {
        async fn stage(
            &self,
            _bytes: &[u8],
            _original_name: &str,
        ) -> Result<StagedUpload, FileStoreError> {
            unimplemented!("not exercised by workflow tests")
        }

        async fn commit(
            &self,
            _staged: StagedUpload,
            _post_id: &str,
            _final_name: Option<&str>,
        ) -> Result<StoredFile, FileStoreError> {
            unimplemented!("not exercised by workflow tests")
        }

        async fn retrieve(
            &self,
            _post_id: &str,
            _filename: &str,
        ) -> Result<RetrievedFile, FileStoreError> {
            unimplemented!("not exercised by workflow tests")
        }

        async fn delete(&self, _post_id: &str, filename: &str) -> Result<(), FileStoreError> {
            if self.failing.contains(filename) {
                return Err(FileStoreError::Io(io::Error::other("disk on fire")));
            }
            self.deleted.lock().unwrap().push(filename.to_string());
            Ok(())
        }
    }

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

    fn draft() -> NewPost {
        NewPost {
            title: "Storm coverage".to_string(),
            content: "Footage from the north side".to_string(),
            scheduled_date: Utc::now(),
            platforms: vec![Platform::Facebook, Platform::Instagram],
            link: None,
        }
    }

    fn file_ref(filename: &str) -> FileRef {
        FileRef {
            filename: filename.to_string(),
            original_name: filename.to_string(),
            content_type: "image/jpeg".to_string(),
            size: 1024,
            uploaded_at: Utc::now(),
        }
    }

    fn workflow_with(files: FakeFiles) -> (Workflow, Arc<MemRepo>, Arc<FakeFiles>) {
        let repo = Arc::new(MemRepo::new());
        let files = Arc::new(files);
        let workflow = Workflow::new(repo.clone(), files.clone());
        (workflow, repo, files)
    }

    async fn seed(workflow: &Workflow, session: &Session, files: &[&str]) -> Post {
        let mut post = workflow.create(session, draft()).await.unwrap();
        for name in files {
            post = workflow
                .attach_file(session, post.id, file_ref(name))
                .await
                .unwrap();
        }
        post
    }

    #[tokio::test]
    async fn create_starts_pending_with_uploader() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);

        let post = workflow.create(&editor, draft()).await.unwrap();

        assert_eq!(post.status, PostStatus::Pending);
        assert_eq!(post.uploaded_by.uid, "editor-1");
        assert!(post.files.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_empty_fields() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);

        let mut no_title = draft();
        no_title.title = "  ".to_string();
        assert!(matches!(
            workflow.create(&editor, no_title).await,
            Err(DomainError::Validation(_))
        ));

        let mut no_platforms = draft();
        no_platforms.platforms.clear();
        assert!(matches!(
            workflow.create(&editor, no_platforms).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn approve_requires_admin() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let post = seed(&workflow, &editor, &[]).await;

        assert!(matches!(
            workflow.approve(&editor, post.id).await,
            Err(DomainError::Forbidden(_))
        ));

        let admin = session("admin-1", true);
        let post = workflow.approve(&admin, post.id).await.unwrap();
        assert_eq!(post.status, PostStatus::Authorized);
    }

    #[tokio::test]
    async fn mark_posted_purges_all_files() {
        let (workflow, _, files) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let admin = session("admin-1", true);

        let post = seed(&workflow, &editor, &["a.jpg", "b.mp4", "c.png"]).await;
        workflow.approve(&admin, post.id).await.unwrap();

        let (post, report) = workflow.mark_posted(&admin, post.id).await.unwrap();

        assert_eq!(post.status, PostStatus::Posted);
        assert!(post.posted_by.is_some());
        assert!(post.posted_at.is_some());
        assert_eq!(report.attempted, 3);
        assert!(!report.is_partial());
        let mut deleted = files.deleted.lock().unwrap().clone();
        deleted.sort();
        assert_eq!(deleted, vec!["a.jpg", "b.mp4", "c.png"]);
    }

    #[tokio::test]
    async fn mark_posted_with_no_files_still_transitions() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let admin = session("admin-1", true);

        let post = seed(&workflow, &editor, &[]).await;
        workflow.approve(&admin, post.id).await.unwrap();
        let (post, report) = workflow.mark_posted(&admin, post.id).await.unwrap();

        assert_eq!(post.status, PostStatus::Posted);
        assert_eq!(report.attempted, 0);
    }

    #[tokio::test]
    async fn mark_posted_rejected_while_pending_keeps_files() {
        let (workflow, _, files) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let admin = session("admin-1", true);

        let post = seed(&workflow, &editor, &["a.jpg"]).await;
        let result = workflow.mark_posted(&admin, post.id).await;

        assert!(matches!(
            result,
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(files.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_continues_past_individual_failures() {
        // Two of three deletions fail; the batch still completes and the
        // record is removed.
        let (workflow, repo, files) =
            workflow_with(FakeFiles::failing_on(&["a.jpg", "b.mp4"]));
        let editor = session("editor-1", false);
        let post = seed(&workflow, &editor, &["a.jpg", "b.mp4", "c.png"]).await;

        let report = workflow.delete(&editor, post.id).await.unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(files.deleted.lock().unwrap().as_slice(), ["c.png"]);
        assert!(repo.store.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_denied_for_non_owner() {
        let (workflow, repo, _) = workflow_with(FakeFiles::new());
        let owner = session("editor-1", false);
        let other = session("editor-2", false);
        let post = seed(&workflow, &owner, &[]).await;

        assert!(matches!(
            workflow.delete(&other, post.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(repo.store.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn edit_appends_diff_summary() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let post = seed(&workflow, &editor, &[]).await;

        let edited = workflow
            .edit(
                &editor,
                post.id,
                PostEdit {
                    title: "Storm coverage, day two".to_string(),
                    content: post.content.clone(),
                    scheduled_date: post.scheduled_date,
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.edits.len(), 1);
        assert!(edited.edits[0].changes.starts_with("Title:"));
    }

    #[tokio::test]
    async fn request_changes_then_edit_resubmits() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let admin = session("admin-1", true);
        let post = seed(&workflow, &editor, &[]).await;

        let post = workflow
            .request_changes(&admin, post.id, "swap the thumbnail".to_string())
            .await
            .unwrap();
        assert_eq!(post.status, PostStatus::ChangesRequested);

        let post = workflow
            .edit(
                &editor,
                post.id,
                PostEdit {
                    title: post.title.clone(),
                    content: "new thumbnail".to_string(),
                    scheduled_date: post.scheduled_date,
                },
            )
            .await
            .unwrap();
        assert_eq!(post.status, PostStatus::Pending);
    }

    #[tokio::test]
    async fn owner_cannot_edit_once_authorized() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let admin = session("admin-1", true);
        let post = seed(&workflow, &editor, &[]).await;
        workflow.approve(&admin, post.id).await.unwrap();

        let result = workflow
            .edit(
                &editor,
                post.id,
                PostEdit {
                    title: "sneaky".to_string(),
                    content: "edit".to_string(),
                    scheduled_date: Utc::now(),
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn attach_file_replaces_same_filename() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let editor = session("editor-1", false);
        let post = seed(&workflow, &editor, &["a.jpg"]).await;

        let post = workflow
            .attach_file(&editor, post.id, file_ref("a.jpg"))
            .await
            .unwrap();
        assert_eq!(post.files.len(), 1);
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let (workflow, _, _) = workflow_with(FakeFiles::new());
        let result = workflow.get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
