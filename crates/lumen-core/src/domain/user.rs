use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity. The authoritative identity lives with the external identity
/// provider; `subject_id` is its stable subject identifier, distinct from
/// our internal row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub subject_id: String,
    pub name: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamp.
    pub fn new(subject_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            name,
            profile_image_url: None,
            created_at: Utc::now(),
        }
    }

    /// Well-defined stand-in for a missing or orphaned author record, so
    /// enriched responses never carry a null author.
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::nil(),
            subject_id: String::new(),
            name: String::new(),
            profile_image_url: None,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}
