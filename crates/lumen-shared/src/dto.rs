//! Data Transfer Objects - request/response types for the API.
//!
//! Request bodies and top-level response keys are camelCase; entity fields
//! inside them stay snake_case, matching the original client contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lumen_core::domain::{Follow, Like, User, UserProfile};
use lumen_core::feed::{CommentWithUser, PostWithUser};

/// Query parameters for the paginated post list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Restrict to one author (profile pages).
    pub user_id: Option<Uuid>,
}

/// `GET /api/posts` response. `total` is omitted on an empty page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostWithUser>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// `POST /api/posts` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub success: bool,
    pub post: PostWithUser,
}

/// `GET /api/posts/{postId}` response: the enriched post plus the full
/// comment thread, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostWithUser,
    pub comments: Vec<CommentWithUser>,
}

/// Request body for `POST /api/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    pub content: String,
}

/// Request body for `DELETE /api/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_id: Uuid,
}

/// `POST /api/comments` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentResponse {
    pub success: bool,
    pub comment: CommentWithUser,
}

/// Request body for `POST /api/likes` and `DELETE /api/likes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub post_id: Uuid,
}

/// `POST /api/likes` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLikeResponse {
    pub success: bool,
    pub like: Like,
}

/// Request body for `POST /api/follows` and `DELETE /api/follows`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub following_id: Uuid,
}

/// `POST /api/follows` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFollowResponse {
    pub success: bool,
    pub follow: Follow,
}

/// Bare acknowledgement for delete-style mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// `GET /api/users/{userId}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub user: UserProfile,
}

/// `PUT /api/users/{userId}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub user: User,
}

/// Query parameters for `GET /api/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub search_type: Option<String>,
    pub limit: Option<u64>,
}

/// `GET /api/search` response. Post hits carry stats but no viewer like
/// state or previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub users: Vec<User>,
    pub posts: Vec<PostWithUser>,
    pub query: String,
    #[serde(rename = "type")]
    pub search_type: String,
}
