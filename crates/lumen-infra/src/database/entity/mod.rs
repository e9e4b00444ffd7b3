//! SeaORM entities for the managed tables and read-only views.

pub mod comment;
pub mod follow;
pub mod like;
pub mod post;
pub mod post_stats;
pub mod user;
pub mod user_stats;
