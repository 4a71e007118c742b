use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Post;
use crate::error::RepoError;

/// Post persistence port. The external database is authoritative; this
/// trait is the logical boundary the workflow talks through. Saves are
/// last-write-wins, with no optimistic concurrency check.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by its unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// All posts, unordered.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// Save a post (create or update).
    async fn save(&self, post: Post) -> Result<Post, RepoError>;

    /// Delete a post record by its ID.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}
