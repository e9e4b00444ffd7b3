use actix_web::{HttpResponse, web};

use lumen_core::domain::Follow;
use lumen_core::error::RepoError;
use lumen_shared::dto::{CreateFollowResponse, FollowRequest, SuccessResponse};

use crate::handlers::require_user;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `POST /api/follows` - rejects self-follows and duplicates.
pub async fn follow_user(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<FollowRequest>,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    if body.following_id == user.id {
        return Err(AppError::BadRequest(
            "You cannot follow yourself.".to_string(),
        ));
    }

    state
        .users
        .find_by_id(body.following_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User to follow not found".to_string()))?;

    if state
        .follows
        .find_pair(user.id, body.following_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Already following this user.".to_string(),
        ));
    }

    // Constraint backstop: the check constraint catches self-follows, the
    // unique pair catches racing duplicates.
    let follow = match state
        .follows
        .insert(Follow::new(user.id, body.following_id))
        .await
    {
        Ok(follow) => follow,
        Err(RepoError::Constraint(msg)) if msg.contains("check") => {
            return Err(AppError::BadRequest(
                "You cannot follow yourself.".to_string(),
            ));
        }
        Err(RepoError::Constraint(_)) => {
            return Err(AppError::Conflict(
                "Already following this user.".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Created().json(CreateFollowResponse {
        success: true,
        follow,
    }))
}

/// `DELETE /api/follows` - idempotent.
pub async fn unfollow_user(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<FollowRequest>,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    let removed = state.follows.delete_pair(user.id, body.following_id).await?;
    if removed == 0 {
        tracing::debug!(
            follower_id = %user.id,
            following_id = %body.following_id,
            "unfollow matched no row"
        );
    }

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
