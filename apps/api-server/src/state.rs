//! Application state - shared across all handlers.

use std::sync::Arc;

use lumen_core::feed::PostAggregator;
use lumen_core::ports::{
    CommentRepository, FollowRepository, LikeRepository, ObjectStore, PostRepository,
    UserRepository,
};
use lumen_infra::database::{
    DbConn, PostgresCommentRepository, PostgresFollowRepository, PostgresLikeRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub storage: Arc<dyn ObjectStore>,
    pub aggregator: PostAggregator,
}

impl AppState {
    /// Wire the repository implementations onto one shared pool.
    pub fn new(db: DbConn, storage: Arc<dyn ObjectStore>) -> Self {
        let db = Arc::new(db);
        let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(db.clone()));
        let posts: Arc<dyn PostRepository> = Arc::new(PostgresPostRepository::new(db.clone()));
        let likes: Arc<dyn LikeRepository> = Arc::new(PostgresLikeRepository::new(db.clone()));
        let comments: Arc<dyn CommentRepository> =
            Arc::new(PostgresCommentRepository::new(db.clone()));
        let follows: Arc<dyn FollowRepository> = Arc::new(PostgresFollowRepository::new(db));

        let aggregator = PostAggregator::new(posts.clone(), likes.clone(), comments.clone());

        tracing::info!("Application state initialized");

        Self {
            users,
            posts,
            likes,
            comments,
            follows,
            storage,
            aggregator,
        }
    }
}
