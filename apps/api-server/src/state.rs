//! Application state - shared across all handlers.

use std::path::PathBuf;
use std::sync::Arc;

use greenlight_core::ports::{FileStore, PostRepository, SessionTokens, TokenExchange};
use greenlight_core::Workflow;
use greenlight_infra::{
    DiskFileStore, InMemoryPostRepository, JwtSessionService, JwtTokenExchange, ServiceAccount,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Workflow,
    pub files: Arc<dyn FileStore>,
    pub sessions: Arc<dyn SessionTokens>,
    /// Absent when no service-account credential could be loaded; the
    /// exchange endpoint reports an internal error in that case while the
    /// rest of the API keeps working.
    pub token_exchange: Option<Arc<dyn TokenExchange>>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl AppState {
    /// Build the application state, creating the upload directory layout.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let store = DiskFileStore::new(&config.upload_dir, config.max_upload_bytes);
        store.ensure_layout().await?;
        let files: Arc<dyn FileStore> = Arc::new(store);

        // The external post database is the authoritative store; without
        // one configured we fall back to process-local memory.
        tracing::warn!("Post database not configured. Running with the in-memory post store.");
        let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new());

        let sessions: Arc<dyn SessionTokens> = Arc::new(JwtSessionService::from_env());

        let token_exchange = match ServiceAccount::load(config.service_account_path.as_deref()) {
            Ok(account) => {
                tracing::info!(project_id = %account.project_id, "service account loaded");
                Some(Arc::new(JwtTokenExchange::new(account)) as Arc<dyn TokenExchange>)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "custom token endpoint will not work without a service account"
                );
                None
            }
        };

        let workflow = Workflow::new(posts, files.clone());

        tracing::info!("Application state initialized");

        Ok(Self {
            workflow,
            files,
            sessions,
            token_exchange,
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}
