//! File retrieval and deletion endpoints.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use greenlight_core::error::DomainError;
use greenlight_shared::Ack;

use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/files/{post_id}/{filename}
///
/// Streams the file back with a content type inferred from its extension.
/// Unauthenticated: download links are followed by plain browser requests.
pub async fn get_file(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (post_id, filename) = path.into_inner();

    let file = state.files.retrieve(&post_id, &filename).await?;

    Ok(HttpResponse::Ok()
        .content_type(file.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(file.bytes))
}

/// DELETE /api/files/{post_id}/{filename}
pub async fn delete_file(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (post_id, filename) = path.into_inner();

    state.files.delete(&post_id, &filename).await?;

    // Keep the post's metadata in sync when the id maps to a record.
    if let Ok(id) = Uuid::parse_str(&post_id) {
        match state.workflow.detach_file(&caller.0, id, &filename).await {
            Ok(_) | Err(DomainError::NotFound { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }

    Ok(HttpResponse::Ok().json(Ack::ok("File deleted successfully")))
}
