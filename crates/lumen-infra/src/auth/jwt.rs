//! JWT-backed identity gateway.
//!
//! Sessions are issued by the external identity provider; this side only
//! verifies the token signature/expiry and extracts the subject id.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use lumen_core::ports::{IdentityError, IdentityGateway, SubjectClaims};

/// Identity gateway configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            issuer: "lumen-identity".to_string(),
        }
    }
}

/// Token claims as serialized by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // external subject id
    exp: i64,
    iss: String,
}

/// Verifies provider-issued HS256 tokens.
pub struct JwtIdentityGateway {
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtIdentityGateway {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer,
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-in-production".to_string());

        if secret == "change-me-in-production" {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self::new(JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "lumen-identity".to_string()),
        })
    }
}

impl IdentityGateway for JwtIdentityGateway {
    fn verify(&self, token: &str) -> Result<SubjectClaims, IdentityError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        IdentityError::TokenExpired
                    }
                    _ => IdentityError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(SubjectClaims {
            subject: token_data.claims.sub,
            exp: token_data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    const SECRET: &str = "test-secret-key";
    const ISSUER: &str = "test-issuer";

    fn gateway() -> JwtIdentityGateway {
        JwtIdentityGateway::new(JwtConfig {
            secret: SECRET.to_string(),
            issuer: ISSUER.to_string(),
        })
    }

    fn issue(subject: &str, issuer: &str, ttl_hours: i64) -> String {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (Utc::now() + TimeDelta::hours(ttl_hours)).timestamp(),
            iss: issuer.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verify_extracts_subject() {
        let token = issue("subj_12345", ISSUER, 1);

        let claims = gateway().verify(&token).unwrap();

        assert_eq!(claims.subject, "subj_12345");
    }

    #[test]
    fn verify_rejects_garbage() {
        let result = gateway().verify("not-a-token");

        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[test]
    fn verify_rejects_expired() {
        let token = issue("subj_12345", ISSUER, -1);

        let result = gateway().verify(&token);

        assert!(matches!(result, Err(IdentityError::TokenExpired)));
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let token = issue("subj_12345", "someone-else", 1);

        assert!(gateway().verify(&token).is_err());
    }
}
