//! Multipart upload endpoint.

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use uuid::Uuid;

use greenlight_core::domain::FileRef;
use greenlight_core::error::DomainError;
use greenlight_shared::dto::UploadResponse;

use crate::middleware::auth::Caller;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/upload
///
/// Multipart form: `file` (binary), `postId` (text), `filename` (text,
/// optional). The payload is staged, then promoted into the post's
/// directory; a failed commit leaves nothing behind in staging.
pub async fn upload(
    state: web::Data<AppState>,
    caller: Caller,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut file: Option<(Vec<u8>, String, Option<String>)> = None;
    let mut post_id: Option<String> = None;
    let mut final_name: Option<String> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().to_string();
        match name.as_str() {
            "file" => {
                let original = field
                    .content_disposition()
                    .get_filename()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let declared_type = field.content_type().map(|mime| mime.to_string());
                let bytes = read_capped(&mut field, state.max_upload_bytes).await?;
                file = Some((bytes, original, declared_type));
            }
            "postId" => post_id = Some(read_text(&mut field).await?),
            "filename" => final_name = Some(read_text(&mut field).await?),
            _ => drain(&mut field).await?,
        }
    }

    let (bytes, original_name, declared_type) =
        file.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let post_id = post_id.unwrap_or_default();

    let staged = state.files.stage(&bytes, &original_name).await?;
    let size = staged.size;
    let stored = state
        .files
        .commit(staged, &post_id, final_name.as_deref())
        .await?;

    // Record the file on the post when the id maps to a known record; the
    // store itself accepts any (sanitized) post id.
    if let Ok(id) = Uuid::parse_str(&post_id) {
        let file_ref = FileRef {
            filename: stored.filename.clone(),
            original_name,
            content_type: declared_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            size,
            uploaded_at: Utc::now(),
        };
        match state.workflow.attach_file(&caller.0, id, file_ref).await {
            Ok(_) => {}
            Err(DomainError::NotFound { .. }) => {
                tracing::debug!(post_id = %id, "upload for id with no post record");
            }
            Err(err) => return Err(err.into()),
        }
    } else {
        tracing::debug!(post_id = %post_id, "upload postId is not a record id");
    }

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        message: "File uploaded successfully".to_string(),
        filename: stored.filename,
        path: stored.path.display().to_string(),
    }))
}

/// Collect a field's bytes, rejecting payloads over the cap as they
/// stream in rather than after buffering the whole body.
async fn read_capped(field: &mut Field, max_bytes: u64) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if (bytes.len() + chunk.len()) as u64 > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes.",
                max_bytes
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text(field: &mut Field) -> Result<String, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).trim().to_string())
}

async fn drain(field: &mut Field) -> Result<(), AppError> {
    while field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .is_some()
    {}
    Ok(())
}
