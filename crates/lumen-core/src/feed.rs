//! Post aggregation - turns raw post rows into viewer-aware, socially
//! enriched records.
//!
//! Every read path that returns posts funnels through [`PostAggregator`] so
//! the enrichment stays bounded: one bulk stats query, one bulk viewer-likes
//! query when a viewer is present, and one bulk preview-comments query,
//! regardless of how many posts are on the page. Handlers must never fetch
//! counts or likes per post.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Comment, Post, User};
use crate::ports::{CommentRepository, LikeRepository, PostRepository};

/// How many comments a post carries in compact display contexts.
pub const PREVIEW_COMMENT_LIMIT: usize = 2;

/// A post row with its joined author, normalized to a single optional
/// record before it reaches the aggregator.
#[derive(Debug, Clone)]
pub struct RawPost {
    pub post: Post,
    pub author: Option<User>,
}

impl RawPost {
    pub fn new(post: Post, author: Option<User>) -> Self {
        Self { post, author }
    }

    /// Normalize the one-to-many join shape, where the author arrives as a
    /// (zero- or single-element) collection, to a single optional record.
    /// The ambiguous shape must not leak past this boundary.
    pub fn from_join(post: Post, authors: Vec<User>) -> Self {
        Self {
            post,
            author: authors.into_iter().next(),
        }
    }
}

/// A comment with its author resolved. Orphaned authors are replaced with
/// the placeholder user so the output shape stays total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithUser {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

impl CommentWithUser {
    pub fn new(comment: Comment, user: Option<User>) -> Self {
        Self {
            comment,
            user: user.unwrap_or_else(User::placeholder),
        }
    }
}

/// A post enriched with author, counters, the viewer's like flag, and up to
/// [`PREVIEW_COMMENT_LIMIT`] most recent comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithUser {
    #[serde(flatten)]
    pub post: Post,
    pub user: User,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
    pub preview_comments: Vec<CommentWithUser>,
}

/// Bulk post enrichment over the repository ports.
#[derive(Clone)]
pub struct PostAggregator {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostAggregator {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            likes,
            comments,
        }
    }

    /// Enrich `rows` for an optional viewer (internal user id). Output
    /// preserves input order and length.
    ///
    /// The post rows themselves are the primary read and were already
    /// fetched by the caller; everything here is secondary, so a failed
    /// lookup degrades (zero counts, `is_liked: false`, empty previews)
    /// instead of failing the whole request.
    pub async fn aggregate(&self, rows: Vec<RawPost>, viewer: Option<Uuid>) -> Vec<PostWithUser> {
        if rows.is_empty() {
            return Vec::new();
        }

        let post_ids: Vec<Uuid> = rows.iter().map(|r| r.post.id).collect();

        let stats = match self.posts.stats_for(&post_ids).await {
            Ok(stats) => stats
                .into_iter()
                .map(|s| (s.post_id, (s.likes_count, s.comments_count)))
                .collect::<HashMap<_, _>>(),
            Err(e) => {
                tracing::warn!(error = %e, "post stats lookup failed, defaulting counts to zero");
                HashMap::new()
            }
        };

        let liked: HashSet<Uuid> = match viewer {
            Some(user_id) => match self.likes.liked_post_ids(user_id, &post_ids).await {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "viewer likes lookup failed, defaulting to unliked");
                    HashSet::new()
                }
            },
            None => HashSet::new(),
        };

        // One descending query for all posts; keep only the first (most
        // recent) PREVIEW_COMMENT_LIMIT per post.
        let mut previews: HashMap<Uuid, Vec<CommentWithUser>> = HashMap::new();
        match self.comments.list_for_posts(&post_ids).await {
            Ok(comments) => {
                for (comment, author) in comments {
                    let bucket = previews.entry(comment.post_id).or_default();
                    if bucket.len() < PREVIEW_COMMENT_LIMIT {
                        bucket.push(CommentWithUser::new(comment, author));
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "preview comments lookup failed, returning empty previews");
            }
        }

        rows.into_iter()
            .map(|row| {
                let (likes_count, comments_count) =
                    stats.get(&row.post.id).copied().unwrap_or((0, 0));
                let preview_comments = previews.remove(&row.post.id).unwrap_or_default();
                PostWithUser {
                    user: row.author.unwrap_or_else(User::placeholder),
                    likes_count,
                    comments_count,
                    is_liked: liked.contains(&row.post.id),
                    preview_comments,
                    post: row.post,
                }
            })
            .collect()
    }
}
