//! HTTP handlers and route configuration.

mod comments;
mod follows;
mod health;
mod likes;
mod posts;
mod search;
mod upload;
mod users;

#[cfg(test)]
mod tests;

use actix_web::web;
use uuid::Uuid;

use lumen_core::domain::User;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Posts
            .route("/posts", web::get().to(posts::list_posts))
            .route("/posts", web::post().to(posts::create_post))
            .route("/posts/{post_id}", web::get().to(posts::get_post))
            .route("/posts/{post_id}", web::delete().to(posts::delete_post))
            // Comments
            .route("/comments", web::post().to(comments::create_comment))
            .route("/comments", web::delete().to(comments::delete_comment))
            // Likes
            .route("/likes", web::post().to(likes::like_post))
            .route("/likes", web::delete().to(likes::unlike_post))
            // Follows
            .route("/follows", web::post().to(follows::follow_user))
            .route("/follows", web::delete().to(follows::unfollow_user))
            // Users
            .route("/users/{user_id}", web::get().to(users::get_profile))
            .route("/users/{user_id}", web::put().to(users::update_profile))
            // Search
            .route("/search", web::get().to(search::search)),
    );
}

/// Map the authenticated subject to its internal user row. The sync between
/// the identity provider and the users table is an external precondition, so
/// a missing row is NotFound rather than Unauthorized.
pub(crate) async fn require_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_subject(&identity.subject)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Resolve an optional session to an internal user id for viewer-aware
/// reads. Lookup failures fall back to anonymous instead of failing the
/// request.
pub(crate) async fn resolve_viewer(
    state: &AppState,
    identity: &OptionalIdentity,
) -> Option<Uuid> {
    let identity = identity.0.as_ref()?;
    match state.users.find_by_subject(&identity.subject).await {
        Ok(user) => user.map(|u| u.id),
        Err(e) => {
            tracing::warn!(error = %e, "viewer resolution failed, proceeding anonymously");
            None
        }
    }
}
