//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use greenlight_core::domain::{Platform, Post, PostStatus};

/// Request to create a post. Files are attached afterwards via the upload
/// endpoint, keyed by the id this call returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub scheduled_date: DateTime<Utc>,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Request to edit a post's fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPostRequest {
    pub title: String,
    pub content: String,
    pub scheduled_date: DateTime<Utc>,
}

/// Admin request for changes on a pending post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestChangesRequest {
    pub message: String,
}

/// Successful upload: the final on-disk name and path of the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub path: String,
}

/// Response to a mark-posted call; `warnings` lists files the purge could
/// not delete (the transition still completed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPostedResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// Request to exchange an identity assertion for a custom token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    pub id_token: String,
}

/// The minted custom token (a compact three-segment JWT).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeResponse {
    pub success: bool,
    pub custom_token: String,
}

/// One dashboard swimlane: posts sharing a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lane {
    pub status: PostStatus,
    pub title: String,
    pub posts: Vec<Post>,
}

/// A scheduled post surfaced in the editor stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingPost {
    pub id: Uuid,
    pub title: String,
    pub scheduled_time: DateTime<Utc>,
}

/// Editor-facing counters shown above the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorStats {
    pub pending_count: usize,
    pub authorized_count: usize,
    pub upcoming: Vec<UpcomingPost>,
}

/// The dashboard: the three main lanes, the change-requested backlog, and
/// the stats header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub lanes: Vec<Lane>,
    pub changes_requested: Vec<Post>,
    pub stats: EditorStats,
}
