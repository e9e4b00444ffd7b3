//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod identity;
mod repository;
mod storage;

pub use identity::{IdentityError, IdentityGateway, SubjectClaims};
pub use repository::{
    BaseRepository, CommentRepository, FollowRepository, LikeRepository, PostRepository,
    UserRepository,
};
pub use storage::{ObjectStore, StorageError, StoredObject};
