use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Session;
use crate::error::DomainError;

/// Approval workflow status of a post.
///
/// Transitions are monotonic along `pending -> authorized -> posted`, with a
/// `pending -> changes_requested -> pending` side loop. Anything else is
/// rejected with [`DomainError::InvalidTransition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Pending,
    Authorized,
    ChangesRequested,
    Posted,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PostStatus::Pending => "pending",
            PostStatus::Authorized => "authorized",
            PostStatus::ChangesRequested => "changes_requested",
            PostStatus::Posted => "posted",
        };
        f.write_str(s)
    }
}

/// Target social platform for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Youtube,
    Tiktok,
}

/// Identity of a user as recorded on posts and history entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub uid: String,
    pub email: String,
}

/// Metadata for one media artifact attached to a post.
///
/// `filename` is the server-assigned on-disk name; `original_name` is the
/// caller-supplied display name and is never used for path construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub filename: String,
    pub original_name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// An admin's request for changes, kept in post history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub requested_by: UserRef,
    pub requested_at: DateTime<Utc>,
    pub message: String,
}

/// One entry of a post's edit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditEntry {
    pub edited_by: UserRef,
    pub edited_at: DateTime<Utc>,
    pub changes: String,
}

/// A unit of proposed social-media content moving through the approval
/// workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub scheduled_date: DateTime<Utc>,
    pub status: PostStatus,
    pub uploaded_by: UserRef,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<FileRef>,
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub change_requests: Vec<ChangeRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_by: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_by: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new pending post uploaded by the given user.
    pub fn new(
        uploaded_by: UserRef,
        title: String,
        content: String,
        scheduled_date: DateTime<Utc>,
        platforms: Vec<Platform>,
        link: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            scheduled_date,
            status: PostStatus::Pending,
            uploaded_by,
            uploaded_at: Utc::now(),
            files: Vec::new(),
            platforms,
            link,
            change_requests: Vec::new(),
            edits: Vec::new(),
            authorized_by: None,
            authorized_at: None,
            posted_by: None,
            posted_at: None,
        }
    }

    pub fn is_owner(&self, session: &Session) -> bool {
        self.uploaded_by.uid == session.user.uid
    }

    /// Admins can edit in any state; the uploader only while the post is
    /// pending (or resubmitting after a change request).
    pub fn editable_by(&self, session: &Session) -> bool {
        session.is_admin()
            || (self.is_owner(session)
                && matches!(
                    self.status,
                    PostStatus::Pending | PostStatus::ChangesRequested
                ))
    }

    /// Admins and the uploader can delete.
    pub fn deletable_by(&self, session: &Session) -> bool {
        session.is_admin() || self.is_owner(session)
    }

    /// `pending -> authorized`, stamping the authorizing admin.
    pub fn approve(&mut self, by: &UserRef) -> Result<(), DomainError> {
        if self.status != PostStatus::Pending {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action: "approve",
            });
        }
        self.status = PostStatus::Authorized;
        self.authorized_by = Some(by.clone());
        self.authorized_at = Some(Utc::now());
        Ok(())
    }

    /// `pending -> changes_requested`, appending the request to history.
    pub fn request_changes(&mut self, by: &UserRef, message: String) -> Result<(), DomainError> {
        if self.status != PostStatus::Pending {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action: "request changes on",
            });
        }
        self.status = PostStatus::ChangesRequested;
        self.change_requests.push(ChangeRequest {
            requested_by: by.clone(),
            requested_at: Utc::now(),
            message,
        });
        Ok(())
    }

    /// Record an edit. A post under `changes_requested` returns to `pending`
    /// (the resubmit loop); other states are left unchanged.
    pub fn record_edit(&mut self, by: &UserRef, changes: String) {
        self.edits.push(EditEntry {
            edited_by: by.clone(),
            edited_at: Utc::now(),
            changes,
        });
        if self.status == PostStatus::ChangesRequested {
            self.status = PostStatus::Pending;
        }
    }

    /// `authorized -> posted`, stamping the posting admin.
    ///
    /// File purging is the caller's responsibility and must happen before
    /// this transition completes; `files` metadata is retained for display.
    pub fn mark_posted(&mut self, by: &UserRef) -> Result<(), DomainError> {
        if self.status != PostStatus::Authorized {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                action: "mark as posted",
            });
        }
        self.status = PostStatus::Posted;
        self.posted_by = Some(by.clone());
        self.posted_at = Some(Utc::now());
        Ok(())
    }
}
