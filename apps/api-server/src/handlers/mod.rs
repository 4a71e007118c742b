//! HTTP handlers and route configuration.

mod files;
mod health;
mod posts;
mod token;
mod upload;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route(
                "/create-custom-token",
                web::post().to(token::create_custom_token),
            )
            // File store surface
            .route("/upload", web::post().to(upload::upload))
            .route(
                "/files/{post_id}/{filename}",
                web::get().to(files::get_file),
            )
            .route(
                "/files/{post_id}/{filename}",
                web::delete().to(files::delete_file),
            )
            // Workflow surface
            .route("/dashboard", web::get().to(posts::dashboard))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::edit))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/approve", web::post().to(posts::approve))
                    .route(
                        "/{id}/request-changes",
                        web::post().to(posts::request_changes),
                    )
                    .route("/{id}/mark-posted", web::post().to(posts::mark_posted)),
            ),
    );
}
