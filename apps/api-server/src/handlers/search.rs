use std::collections::HashMap;

use actix_web::{HttpResponse, web};

use lumen_core::domain::User;
use lumen_core::feed::PostWithUser;
use lumen_shared::dto::{SearchQuery, SearchResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_QUERY_CHARS: usize = 2;
const DEFAULT_SEARCH_LIMIT: u64 = 20;
const MAX_SEARCH_LIMIT: u64 = 100;

/// `GET /api/search` - substring search over user names and post captions.
/// Post hits carry counters but no viewer-specific state.
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let q = query.q.as_deref().unwrap_or("").trim().to_string();
    if q.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::BadRequest(format!(
            "Search query must be at least {MIN_QUERY_CHARS} characters."
        )));
    }

    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    if limit < 1 || limit > MAX_SEARCH_LIMIT {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_SEARCH_LIMIT}."
        )));
    }

    let search_type = query.search_type.as_deref().unwrap_or("all").to_string();

    // Each branch degrades to empty results on failure so that one bad
    // read does not take out the whole search.
    let users: Vec<User> = if search_type == "all" || search_type == "users" {
        match state.users.search_by_name(&q, limit).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, "user search failed");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let posts: Vec<PostWithUser> = if search_type == "all" || search_type == "posts" {
        match state.posts.search_by_caption(&q, limit).await {
            Ok(rows) => {
                let post_ids: Vec<_> = rows.iter().map(|(p, _)| p.id).collect();
                let stats: HashMap<_, _> = match state.posts.stats_for(&post_ids).await {
                    Ok(stats) => stats
                        .into_iter()
                        .map(|s| (s.post_id, (s.likes_count, s.comments_count)))
                        .collect(),
                    Err(e) => {
                        tracing::warn!(error = %e, "search stats lookup failed");
                        HashMap::new()
                    }
                };
                rows.into_iter()
                    .map(|(post, author)| {
                        let (likes_count, comments_count) =
                            stats.get(&post.id).copied().unwrap_or((0, 0));
                        PostWithUser {
                            post,
                            user: author.unwrap_or_else(User::placeholder),
                            likes_count,
                            comments_count,
                            is_liked: false,
                            preview_comments: Vec::new(),
                        }
                    })
                    .collect()
            }
            Err(e) => {
                tracing::warn!(error = %e, "post search failed");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    Ok(HttpResponse::Ok().json(SearchResponse {
        users,
        posts,
        query: q,
        search_type,
    }))
}
