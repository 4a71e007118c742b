//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use greenlight_infra::files::DEFAULT_MAX_BYTES;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Root of the on-disk file store; created at startup if absent.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    /// Service-account credential file for the token exchange. The
    /// `SERVICE_ACCOUNT` env var (raw JSON) is the fallback.
    pub service_account_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5500),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads").join("social-posts")),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BYTES),
            service_account_path: Some(
                env::var("SERVICE_ACCOUNT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("service-account.json")),
            ),
        }
    }
}
