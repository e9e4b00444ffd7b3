//! # Lumen Core
//!
//! The domain layer of the Lumen feed service.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the ports the infrastructure must implement, and the post
//! aggregation routine that enriches raw post rows with social context.

pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;

pub use error::RepoError;
