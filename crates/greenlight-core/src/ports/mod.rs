//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod files;
mod repository;

pub use auth::{AuthError, SessionClaims, SessionTokens, TokenExchange};
pub use files::{FileStore, FileStoreError, RetrievedFile, StagedUpload, StoredFile};
pub use repository::PostRepository;
