use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-post counters, read from the `post_stats` view. Maintained by the
/// store; read-only to the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStats {
    pub post_id: Uuid,
    pub likes_count: i64,
    pub comments_count: i64,
}

/// Per-user counters, read from the `user_stats` view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: Uuid,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

/// Viewer-aware profile record returned by the profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub subject_id: String,
    pub name: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub is_following: bool,
    pub is_own_profile: bool,
}
