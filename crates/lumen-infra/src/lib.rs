//! # Lumen Infrastructure
//!
//! Concrete implementations of the ports defined in `lumen-core`:
//! PostgreSQL repositories via SeaORM, the JWT identity gateway, and the
//! S3-backed (or in-memory) object store.

pub mod auth;
pub mod database;
pub mod storage;

pub use auth::{JwtConfig, JwtIdentityGateway};
pub use database::DatabaseConfig;
pub use storage::{InMemoryObjectStore, S3Config, S3ObjectStore};
