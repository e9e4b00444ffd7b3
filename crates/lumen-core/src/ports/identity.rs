//! Identity gateway port - session verification against the external
//! identity provider.

/// Claims resolved from a verified bearer session.
#[derive(Debug, Clone)]
pub struct SubjectClaims {
    /// Stable identifier issued by the identity provider for the principal.
    /// Distinct from the application's internal user row id.
    pub subject: String,
    pub exp: i64,
}

/// Verifies a request's bearer session and yields the external subject id.
pub trait IdentityGateway: Send + Sync {
    fn verify(&self, token: &str) -> Result<SubjectClaims, IdentityError>;
}

/// Identity verification errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
