//! Object store adapters: S3 for real deployments, in-memory for
//! development and tests.

mod memory;
mod s3;

pub use memory::InMemoryObjectStore;
pub use s3::{S3Config, S3ObjectStore};
