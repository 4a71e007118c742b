use std::path::PathBuf;

use async_trait::async_trait;

/// Handle to a staged upload awaiting commit.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    /// Absolute path of the temp file.
    pub path: PathBuf,
    /// Server-generated collision-resistant filename.
    pub filename: String,
    pub size: u64,
}

/// A committed file's final location.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Bytes plus the content type inferred from the file extension.
#[derive(Debug, Clone)]
pub struct RetrievedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Binary artifact storage, partitioned by post identifier.
///
/// Uploads are staged first and promoted with an atomic rename, so a file
/// is never visible under its final name half-written.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write the payload to the staging area under a server-generated
    /// unique name derived from `original_name`'s extension.
    async fn stage(
        &self,
        bytes: &[u8],
        original_name: &str,
    ) -> Result<StagedUpload, FileStoreError>;

    /// Move a staged file into the post's directory. On any failure the
    /// staged temp file is deleted; no orphans survive a failed commit.
    async fn commit(
        &self,
        staged: StagedUpload,
        post_id: &str,
        final_name: Option<&str>,
    ) -> Result<StoredFile, FileStoreError>;

    /// Read a file back, re-reading from disk every time.
    async fn retrieve(
        &self,
        post_id: &str,
        filename: &str,
    ) -> Result<RetrievedFile, FileStoreError>;

    /// Remove a file; removes the post directory too once it is empty.
    async fn delete(&self, post_id: &str, filename: &str) -> Result<(), FileStoreError>;
}

/// File store failures.
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("File type .{0} is not allowed")]
    InvalidMediaType(String),

    #[error("File of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("postId is required")]
    MissingPostId,

    #[error("File not found")]
    NotFound,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
