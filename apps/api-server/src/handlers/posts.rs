//! Post workflow endpoints: creation, edits, transitions, dashboard.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use greenlight_core::domain::{Post, PostStatus};
use greenlight_core::workflow::{NewPost, PostEdit};
use greenlight_shared::dto::{
    CreatePostRequest, DashboardResponse, EditPostRequest, EditorStats, Lane, MarkPostedResponse,
    RequestChangesRequest, UpcomingPost,
};

use crate::middleware::auth::Caller;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .workflow
        .create(
            &caller.0,
            NewPost {
                title: req.title,
                content: req.content,
                scheduled_date: req.scheduled_date,
                platforms: req.platforms,
                link: req.link.filter(|l| !l.trim().is_empty()),
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>, _caller: Caller) -> AppResult<HttpResponse> {
    let mut posts = state.workflow.list().await?;
    posts.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    _caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.workflow.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /api/posts/{id}
pub async fn edit(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<EditPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .workflow
        .edit(
            &caller.0,
            path.into_inner(),
            PostEdit {
                title: req.title,
                content: req.content,
                scheduled_date: req.scheduled_date,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts/{id}/approve
pub async fn approve(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.workflow.approve(&caller.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts/{id}/request-changes
pub async fn request_changes(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<RequestChangesRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .workflow
        .request_changes(&caller.0, path.into_inner(), body.into_inner().message)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts/{id}/mark-posted
///
/// Purges the post's files, then records the transition. Files the purge
/// could not delete come back as warnings; the transition still holds.
pub async fn mark_posted(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let (_, report) = state
        .workflow
        .mark_posted(&caller.0, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MarkPostedResponse {
        success: true,
        message: "Post marked as posted".to_string(),
        warnings: report.warnings(),
    }))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let report = state.workflow.delete(&caller.0, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MarkPostedResponse {
        success: true,
        message: "Post deleted successfully".to_string(),
        warnings: report.warnings(),
    }))
}

/// GET /api/dashboard
///
/// Posts grouped into status lanes plus the editor stats header.
pub async fn dashboard(state: web::Data<AppState>, _caller: Caller) -> AppResult<HttpResponse> {
    let posts = state.workflow.list().await?;

    let lane = |status: PostStatus, title: &str| -> Lane {
        Lane {
            status,
            title: title.to_string(),
            posts: posts
                .iter()
                .filter(|p| p.status == status)
                .cloned()
                .collect(),
        }
    };

    let pending_count = posts
        .iter()
        .filter(|p| p.status == PostStatus::Pending)
        .count();
    let authorized_count = posts
        .iter()
        .filter(|p| p.status == PostStatus::Authorized)
        .count();

    let mut upcoming: Vec<UpcomingPost> = posts
        .iter()
        .filter(|p| {
            matches!(p.status, PostStatus::Pending | PostStatus::Authorized)
        })
        .map(|p| UpcomingPost {
            id: p.id,
            title: p.title.clone(),
            scheduled_time: p.scheduled_date,
        })
        .collect();
    upcoming.sort_by_key(|p| p.scheduled_time);

    let changes_requested: Vec<Post> = posts
        .iter()
        .filter(|p| p.status == PostStatus::ChangesRequested)
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(DashboardResponse {
        lanes: vec![
            lane(PostStatus::Pending, "Pending"),
            lane(PostStatus::Authorized, "Authorized"),
            lane(PostStatus::Posted, "Posted"),
        ],
        changes_requested,
        stats: EditorStats {
            pending_count,
            authorized_count,
            upcoming,
        },
    }))
}
