//! Multipart form reading for image uploads.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use uuid::Uuid;

use crate::middleware::error::{AppError, AppResult};

/// Maximum accepted image size in bytes (5 MB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image file read out of a multipart request, already validated for
/// size and content type.
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: &'static str,
}

/// Text fields plus at most one image extracted from a multipart form.
pub struct ImageForm {
    pub image: Option<UploadedImage>,
    pub text_fields: HashMap<String, String>,
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Build an object key that is unique per upload and groups objects by
/// subject, e.g. `posts/user_123/1700000000-<uuid>.jpg`.
pub fn object_key(prefix: &str, subject: &str, extension: &str) -> String {
    format!(
        "{}/{}/{}-{}.{}",
        prefix,
        subject,
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        extension
    )
}

/// Drain a multipart payload, treating the field named `image_field` as the
/// image and collecting every other field as UTF-8 text.
///
/// The image body is size-checked while streaming so an oversized upload is
/// rejected without buffering the whole file.
pub async fn read_image_form(payload: &mut Multipart, image_field: &str) -> AppResult<ImageForm> {
    let mut image = None;
    let mut text_fields = HashMap::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == image_field {
            let content_type = field
                .content_type()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_default();
            let extension = extension_for(&content_type).ok_or_else(|| {
                AppError::UnsupportedMediaType(
                    "Only JPEG, PNG and WebP images are allowed.".to_string(),
                )
            })?;

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
                if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::PayloadTooLarge(
                        "Image must be 5MB or smaller.".to_string(),
                    ));
                }
                bytes.extend_from_slice(&chunk);
            }

            image = Some(UploadedImage {
                bytes,
                content_type,
                extension,
            });
        } else {
            let mut buf = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {e}")))?;
                buf.extend_from_slice(&chunk);
            }
            text_fields.insert(name, String::from_utf8_lossy(&buf).into_owned());
        }
    }

    Ok(ImageForm { image, text_fields })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_image_types_map_to_extensions() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/webp"), Some("webp"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[test]
    fn object_keys_are_namespaced_and_unique() {
        let a = object_key("posts", "user_1", "jpg");
        let b = object_key("posts", "user_1", "jpg");
        assert!(a.starts_with("posts/user_1/"));
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
    }
}
