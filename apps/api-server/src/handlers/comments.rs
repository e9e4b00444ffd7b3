use actix_web::{HttpResponse, web};

use lumen_core::domain::Comment;
use lumen_core::feed::CommentWithUser;
use lumen_shared::dto::{
    CreateCommentRequest, CreateCommentResponse, DeleteCommentRequest, SuccessResponse,
};

use crate::handlers::require_user;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `POST /api/comments`
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest(
            "Comment content is required.".to_string(),
        ));
    }

    state
        .posts
        .find_by_id(body.post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comment = state
        .comments
        .insert(Comment::new(body.post_id, user.id, content.to_string()))
        .await?;

    tracing::info!(comment_id = %comment.id, post_id = %body.post_id, "comment created");

    Ok(HttpResponse::Created().json(CreateCommentResponse {
        success: true,
        comment: CommentWithUser::new(comment, Some(user)),
    }))
}

/// `DELETE /api/comments` - owner only.
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<DeleteCommentRequest>,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    let comment = state
        .comments
        .find_by_id(body.comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if comment.user_id != user.id {
        return Err(AppError::Forbidden(
            "You can only delete your own comments.".to_string(),
        ));
    }

    state.comments.delete(body.comment_id).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
