use actix_web::{HttpResponse, web};
use uuid::Uuid;

use lumen_core::domain::{MAX_CAPTION_CHARS, Post};
use lumen_core::feed::{CommentWithUser, PostWithUser, RawPost};
use lumen_shared::dto::{
    CreatePostResponse, ListPostsQuery, PostDetailResponse, PostListResponse, SuccessResponse,
};

use crate::handlers::{require_user, resolve_viewer, upload};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// `GET /api/posts` - paginated feed, newest first, optionally filtered to
/// one author via `userId`.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    // Client-supplied paging values are clamped, never trusted.
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let rows = state.posts.page(limit, offset, query.user_id).await?;

    if rows.is_empty() {
        return Ok(HttpResponse::Ok().json(PostListResponse {
            posts: Vec::new(),
            has_more: false,
            total: None,
        }));
    }

    let viewer_id = resolve_viewer(&state, &viewer).await;
    let raw: Vec<RawPost> = rows
        .into_iter()
        .map(|(post, author)| RawPost::new(post, author))
        .collect();
    let posts = state.aggregator.aggregate(raw, viewer_id).await;

    // The count backs the hasMore hint only, so a failure degrades.
    let total = match state.posts.count(query.user_id).await {
        Ok(total) => total,
        Err(e) => {
            tracing::warn!(error = %e, "post count failed, reporting hasMore=false");
            0
        }
    };

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts,
        has_more: offset.saturating_add(limit) < total,
        total: Some(total),
    }))
}

/// `POST /api/posts` - multipart form with a required `image` file and an
/// optional `caption` text field.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    mut payload: actix_multipart::Multipart,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    let form = upload::read_image_form(&mut payload, "image").await?;
    let image = form
        .image
        .ok_or_else(|| AppError::BadRequest("An image file is required.".to_string()))?;

    let caption = form
        .text_fields
        .get("caption")
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if let Some(caption) = &caption {
        if caption.chars().count() > MAX_CAPTION_CHARS {
            return Err(AppError::BadRequest(format!(
                "Caption must be {MAX_CAPTION_CHARS} characters or fewer."
            )));
        }
    }

    // Upload first; if the insert fails afterwards, remove the orphan so
    // the store does not accumulate unreferenced objects.
    let key = upload::object_key("posts", &identity.subject, image.extension);
    let stored = state
        .storage
        .put(&key, image.bytes, &image.content_type)
        .await?;

    let post = match state
        .posts
        .insert(Post::new(user.id, stored.url, caption))
        .await
    {
        Ok(post) => post,
        Err(e) => {
            if let Err(del) = state.storage.delete(&key).await {
                tracing::warn!(error = %del, %key, "failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    tracing::info!(post_id = %post.id, user_id = %user.id, "post created");

    Ok(HttpResponse::Created().json(CreatePostResponse {
        success: true,
        post: PostWithUser {
            post,
            user,
            likes_count: 0,
            comments_count: 0,
            is_liked: false,
            preview_comments: Vec::new(),
        },
    }))
}

/// `GET /api/posts/{postId}` - single post with the full comment thread.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let (post, author) = state
        .posts
        .find_with_author(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    // Everything past the post row itself is secondary and degrades.
    let comments: Vec<CommentWithUser> = match state.comments.list_for_post(post_id).await {
        Ok(rows) => rows
            .into_iter()
            .map(|(comment, user)| CommentWithUser::new(comment, user))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, %post_id, "comment thread lookup failed");
            Vec::new()
        }
    };

    let (likes_count, comments_count) = match state.posts.stats_for(&[post_id]).await {
        Ok(stats) => stats
            .first()
            .map(|s| (s.likes_count, s.comments_count))
            .unwrap_or((0, 0)),
        Err(e) => {
            tracing::warn!(error = %e, %post_id, "post stats lookup failed");
            (0, 0)
        }
    };

    let is_liked = match resolve_viewer(&state, &viewer).await {
        Some(viewer_id) => match state.likes.find_pair(post_id, viewer_id).await {
            Ok(like) => like.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, %post_id, "viewer like lookup failed");
                false
            }
        },
        None => false,
    };

    let post = PostWithUser {
        post,
        user: author.unwrap_or_else(lumen_core::domain::User::placeholder),
        likes_count,
        comments_count,
        is_liked,
        preview_comments: comments.clone(),
    };

    Ok(HttpResponse::Ok().json(PostDetailResponse { post, comments }))
}

/// `DELETE /api/posts/{postId}` - owner only. The stored image is removed
/// best-effort after the row.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;
    let post_id = path.into_inner();

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.user_id != user.id {
        return Err(AppError::Forbidden(
            "You can only delete your own posts.".to_string(),
        ));
    }

    state.posts.delete(post_id).await?;

    match state.storage.key_for_url(&post.image_url) {
        Some(key) => {
            if let Err(e) = state.storage.delete(&key).await {
                tracing::warn!(error = %e, %key, "failed to delete post image");
            }
        }
        None => {
            tracing::debug!(url = %post.image_url, "post image not in managed storage, skipping");
        }
    }

    tracing::info!(%post_id, user_id = %user.id, "post deleted");

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
