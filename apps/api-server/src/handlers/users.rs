use actix_web::{HttpResponse, web};
use uuid::Uuid;

use lumen_core::domain::{MAX_NAME_CHARS, UserProfile};
use lumen_shared::dto::{UpdateProfileResponse, UserProfileResponse};

use crate::handlers::{require_user, resolve_viewer, upload};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `GET /api/users/{userId}` - profile with counters and viewer-relative
/// flags.
pub async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Counters come from a view derived from the base tables, so a missing
    // or failed read degrades to zeros rather than failing the profile.
    let stats = match state.users.stats(user_id).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(error = %e, %user_id, "user stats lookup failed");
            None
        }
    };
    let (posts_count, followers_count, following_count) = stats
        .map(|s| (s.posts_count, s.followers_count, s.following_count))
        .unwrap_or((0, 0, 0));

    let viewer_id = resolve_viewer(&state, &viewer).await;
    let is_own_profile = viewer_id == Some(user_id);
    let is_following = match viewer_id {
        Some(viewer_id) if !is_own_profile => {
            match state.follows.find_pair(viewer_id, user_id).await {
                Ok(follow) => follow.is_some(),
                Err(e) => {
                    tracing::warn!(error = %e, %user_id, "follow state lookup failed");
                    false
                }
            }
        }
        _ => false,
    };

    Ok(HttpResponse::Ok().json(UserProfileResponse {
        user: UserProfile {
            id: user.id,
            subject_id: user.subject_id,
            name: user.name,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at,
            posts_count,
            followers_count,
            following_count,
            is_following,
            is_own_profile,
        },
    }))
}

/// `PUT /api/users/{userId}` - multipart form with optional `name` and
/// `profileImage` fields; at least one must be present. Own profile only.
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    mut payload: actix_multipart::Multipart,
) -> AppResult<HttpResponse> {
    let user = require_user(&state, &identity).await?;

    if path.into_inner() != user.id {
        return Err(AppError::Forbidden(
            "You can only edit your own profile.".to_string(),
        ));
    }

    let form = upload::read_image_form(&mut payload, "profileImage").await?;

    let name = match form.text_fields.get("name") {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(AppError::BadRequest("Name is required.".to_string()));
            }
            if trimmed.chars().count() > MAX_NAME_CHARS {
                return Err(AppError::BadRequest(format!(
                    "Name must be {MAX_NAME_CHARS} characters or fewer."
                )));
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    let mut new_key = None;
    let new_url = match form.image {
        Some(image) => {
            let key = upload::object_key("profiles", &identity.subject, image.extension);
            let stored = state
                .storage
                .put(&key, image.bytes, &image.content_type)
                .await?;
            new_key = Some(key);
            Some(stored.url)
        }
        None => None,
    };

    if name.is_none() && new_url.is_none() {
        return Err(AppError::BadRequest("Nothing to update.".to_string()));
    }

    let updated = match state
        .users
        .update_profile(user.id, name, new_url.clone())
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(key) = new_key {
                if let Err(del) = state.storage.delete(&key).await {
                    tracing::warn!(error = %del, %key, "failed to remove orphaned avatar");
                }
            }
            return Err(e.into());
        }
    };

    // Replace, then clean up the previous avatar best-effort.
    if new_url.is_some() {
        if let Some(old_url) = &user.profile_image_url {
            if let Some(old_key) = state.storage.key_for_url(old_url) {
                if let Err(e) = state.storage.delete(&old_key).await {
                    tracing::warn!(error = %e, key = %old_key, "failed to delete old avatar");
                }
            }
        }
    }

    tracing::info!(user_id = %user.id, "profile updated");

    Ok(HttpResponse::Ok().json(UpdateProfileResponse {
        success: true,
        user: updated,
    }))
}
