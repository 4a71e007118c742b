//! In-memory post repository - used when the external database is not
//! configured. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use greenlight_core::domain::Post;
use greenlight_core::error::RepoError;
use greenlight_core::ports::PostRepository;

/// HashMap-backed repository behind an async RwLock. Saves are
/// last-write-wins, matching the external store's semantics.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.store.read().await.values().cloned().collect())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store.write().await.remove(&id);
        Ok(())
    }
}
