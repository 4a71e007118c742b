//! Disk-backed file store: staged uploads promoted by atomic rename into
//! per-post directories under the upload root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use greenlight_core::ports::{
    FileStore, FileStoreError, RetrievedFile, StagedUpload, StoredFile,
};

/// 500 MiB upload cap.
pub const DEFAULT_MAX_BYTES: u64 = 500 * 1024 * 1024;

const TEMP_DIR: &str = "temp";

const ALLOWED_EXTENSIONS: [&str; 9] = [
    "jpeg", "jpg", "png", "gif", "mp4", "mov", "avi", "webm", "mkv",
];

/// File store rooted at a local directory, laid out as
/// `<root>/<postId>/<filename>` with staging under `<root>/temp/`.
pub struct DiskFileStore {
    root: PathBuf,
    max_bytes: u64,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Create the upload root and staging directory if absent.
    pub async fn ensure_layout(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.root.join(TEMP_DIR)).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn commit_paths(
        &self,
        staged: &StagedUpload,
        post_id: &str,
        final_name: Option<&str>,
    ) -> Result<(PathBuf, String), FileStoreError> {
        let dir_name = sanitize(post_id).ok_or(FileStoreError::MissingPostId)?;
        let filename = final_name
            .and_then(sanitize)
            .unwrap_or_else(|| staged.filename.clone());
        Ok((self.root.join(dir_name), filename))
    }
}

/// Reduce untrusted input to its base name, neutralizing traversal
/// sequences. `None` when nothing usable remains (empty, `..`, `/`).
fn sanitize(input: &str) -> Option<String> {
    Path::new(input)
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}

/// Server-generated collision-resistant filename keeping the original
/// stem and extension.
fn unique_name(original: &str) -> String {
    let base = sanitize(original).unwrap_or_else(|| "upload".to_string());
    let path = Path::new(&base);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    match extension_of(&base) {
        Some(ext) => format!("{stem}-{millis}-{}.{ext}", &suffix[..8]),
        None => format!("{stem}-{millis}-{}", &suffix[..8]),
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Explicit extension-to-MIME table; everything else is served as an
/// opaque byte stream.
fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl FileStore for DiskFileStore {
    async fn stage(
        &self,
        bytes: &[u8],
        original_name: &str,
    ) -> Result<StagedUpload, FileStoreError> {
        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(FileStoreError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        let ext = extension_of(original_name)
            .ok_or_else(|| FileStoreError::InvalidMediaType(String::new()))?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(FileStoreError::InvalidMediaType(ext));
        }

        let temp = self.root.join(TEMP_DIR);
        fs::create_dir_all(&temp).await?;

        let filename = unique_name(original_name);
        let path = temp.join(&filename);
        fs::write(&path, bytes).await?;
        tracing::debug!(filename = %filename, size, "upload staged");

        Ok(StagedUpload {
            path,
            filename,
            size,
        })
    }

    async fn commit(
        &self,
        staged: StagedUpload,
        post_id: &str,
        final_name: Option<&str>,
    ) -> Result<StoredFile, FileStoreError> {
        let result = match self.commit_paths(&staged, post_id, final_name) {
            Ok((dir, filename)) => {
                let dest = dir.join(&filename);
                match fs::create_dir_all(&dir).await {
                    Ok(()) => fs::rename(&staged.path, &dest)
                        .await
                        .map(|()| StoredFile {
                            filename,
                            path: dest,
                        })
                        .map_err(FileStoreError::from),
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(stored) => {
                tracing::info!(post_id, filename = %stored.filename, "upload committed");
            }
            Err(_) => {
                // No orphaned temp files survive a failed commit.
                if let Err(err) = fs::remove_file(&staged.path).await {
                    tracing::warn!(path = %staged.path.display(), error = %err, "failed to clean up staged file");
                }
            }
        }
        result
    }

    async fn retrieve(
        &self,
        post_id: &str,
        filename: &str,
    ) -> Result<RetrievedFile, FileStoreError> {
        let dir = sanitize(post_id).ok_or(FileStoreError::NotFound)?;
        let name = sanitize(filename).ok_or(FileStoreError::NotFound)?;
        let path = self.root.join(dir).join(&name);

        let bytes = fs::read(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FileStoreError::NotFound
            } else {
                err.into()
            }
        })?;

        Ok(RetrievedFile {
            bytes,
            content_type: content_type_for(&name),
        })
    }

    async fn delete(&self, post_id: &str, filename: &str) -> Result<(), FileStoreError> {
        let dir_name = sanitize(post_id).ok_or(FileStoreError::NotFound)?;
        let name = sanitize(filename).ok_or(FileStoreError::NotFound)?;
        let dir = self.root.join(dir_name);
        let path = dir.join(&name);

        fs::remove_file(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FileStoreError::NotFound
            } else {
                FileStoreError::from(err)
            }
        })?;
        tracing::info!(post_id, filename = %name, "file deleted");

        // Drop the post directory once the last file is gone.
        if let Ok(mut entries) = fs::read_dir(&dir).await {
            if entries.next_entry().await.ok().flatten().is_none() {
                let _ = fs::remove_dir(&dir).await;
            }
        }
        Ok(())
    }
}
