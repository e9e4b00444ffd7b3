//! Identity gateway implementation.

mod jwt;

pub use jwt::{JwtConfig, JwtIdentityGateway};
