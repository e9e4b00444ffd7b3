use actix_web::{HttpResponse, web};

use lumen_core::domain::Like;
use lumen_core::error::RepoError;
use lumen_shared::dto::{CreateLikeResponse, LikeRequest, SuccessResponse};

use crate::handlers::require_user;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `POST /api/likes` - liking a post twice is a client error.
pub async fn like_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    state
        .posts
        .find_by_id(body.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if state
        .likes
        .find_pair(body.post_id, user.id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "You already liked this post.".to_string(),
        ));
    }

    // The unique (post_id, user_id) constraint backstops the pre-check
    // against racing requests.
    let like = match state.likes.insert(Like::new(body.post_id, user.id)).await {
        Ok(like) => like,
        Err(RepoError::Constraint(_)) => {
            return Err(AppError::BadRequest(
                "You already liked this post.".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Created().json(CreateLikeResponse {
        success: true,
        like,
    }))
}

/// `DELETE /api/likes` - idempotent; unliking a post that was never liked
/// still succeeds.
pub async fn unlike_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    let removed = state.likes.delete_pair(body.post_id, user.id).await?;
    if removed == 0 {
        tracing::debug!(post_id = %body.post_id, user_id = %user.id, "unlike matched no row");
    }

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
