use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Follow, Like, Post, PostStats, User, UserStats};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity, returning the stored row.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. `NotFound` when no row matched.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository, including the subject-id lookup that maps an external
/// identity to an internal user row.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Resolve the external subject id to an internal user row.
    async fn find_by_subject(&self, subject_id: &str) -> Result<Option<User>, RepoError>;

    /// Case-insensitive substring search on display name, newest first.
    async fn search_by_name(&self, query: &str, limit: u64) -> Result<Vec<User>, RepoError>;

    /// Per-user counters from the `user_stats` view.
    async fn stats(&self, user_id: Uuid) -> Result<Option<UserStats>, RepoError>;

    /// Update display name and/or avatar URL, returning the updated row.
    async fn update_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        profile_image_url: Option<String>,
    ) -> Result<User, RepoError>;
}

/// Post repository. Read paths return the author joined in, as an
/// `Option` since the row may be orphaned.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of posts, newest first, optionally filtered to one author.
    async fn page(
        &self,
        limit: u64,
        offset: u64,
        author: Option<Uuid>,
    ) -> Result<Vec<(Post, Option<User>)>, RepoError>;

    /// Total post count, with the same optional author filter as `page`.
    async fn count(&self, author: Option<Uuid>) -> Result<u64, RepoError>;

    /// Single post with its author.
    async fn find_with_author(&self, id: Uuid) -> Result<Option<(Post, Option<User>)>, RepoError>;

    /// Case-insensitive substring search on caption, newest first.
    async fn search_by_caption(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<Vec<(Post, Option<User>)>, RepoError>;

    /// Bulk counters from the `post_stats` view for the given post ids.
    async fn stats_for(&self, post_ids: &[Uuid]) -> Result<Vec<PostStats>, RepoError>;
}

/// Like repository.
#[async_trait]
pub trait LikeRepository: BaseRepository<Like, Uuid> {
    /// Existing like for a (post, user) pair, if any.
    async fn find_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Like>, RepoError>;

    /// Delete the (post, user) like. Returns the number of rows removed;
    /// zero is not an error (unlike is idempotent).
    async fn delete_pair(&self, post_id: Uuid, user_id: Uuid) -> Result<u64, RepoError>;

    /// Subset of `post_ids` the given user has liked.
    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError>;
}

/// Comment repository. Read paths return the author joined in.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// All comments on one post, most recent first.
    async fn list_for_post(&self, post_id: Uuid)
    -> Result<Vec<(Comment, Option<User>)>, RepoError>;

    /// All comments on the given posts in one query, most recent first.
    async fn list_for_posts(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<(Comment, Option<User>)>, RepoError>;
}

/// Follow repository.
#[async_trait]
pub trait FollowRepository: BaseRepository<Follow, Uuid> {
    /// Existing follow for a (follower, following) pair, if any.
    async fn find_pair(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Follow>, RepoError>;

    /// Delete the (follower, following) row. Returns rows removed; zero is
    /// not an error (unfollow is idempotent).
    async fn delete_pair(&self, follower_id: Uuid, following_id: Uuid) -> Result<u64, RepoError>;
}
