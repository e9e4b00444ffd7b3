//! Domain entities - the core business objects.

mod comment;
mod follow;
mod like;
mod post;
mod stats;
mod user;

pub use comment::Comment;
pub use follow::Follow;
pub use like::Like;
pub use post::Post;
pub use stats::{PostStats, UserProfile, UserStats};
pub use user::User;

/// Maximum display name length, in characters.
pub const MAX_NAME_CHARS: usize = 30;

/// Maximum post caption length, in characters.
pub const MAX_CAPTION_CHARS: usize = 2200;
