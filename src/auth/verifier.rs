//! Bearer credential verification.
//!
//! # Responsibilities
//! - Parse the `Authorization: Bearer <token>` header
//! - Verify the token signature against the shared HMAC secret
//! - Reject expired tokens (zero leeway)
//! - Produce an [`Identity`] from the token claims
//!
//! # Design Decisions
//! - HS256 only; any other signing scheme is rejected
//! - Pure computation, no side effects, re-verified on every request
//! - Expired is distinguishable from InvalidSignature internally but both
//!   surface to callers as a generic "invalid token"

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::auth::identity::{Claims, Identity};
use crate::http::response::json_error;

/// Authentication failure kinds.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredential,

    #[error("invalid authorization format")]
    MalformedCredential,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredential => "missing authorization header",
            AuthError::MalformedCredential => "invalid authorization format",
            // Expired and forged tokens look the same to callers.
            AuthError::InvalidSignature | AuthError::Expired => "invalid token",
        };
        json_error(StatusCode::UNAUTHORIZED, message)
    }
}

/// Verify a bearer credential from an `Authorization` header value.
///
/// `header_value` is `None` when the header is absent, and the raw header
/// string otherwise.
pub fn verify(header_value: Option<&str>, shared_secret: &str) -> Result<Identity, AuthError> {
    let header = header_value.ok_or(AuthError::MissingCredential)?;

    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().ok_or(AuthError::MalformedCredential)?;
    if scheme != "Bearer" || token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedCredential);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    // The window contract is "valid strictly before expires-at"; the default
    // 60s leeway would let expired tokens through.
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(shared_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidSignature,
    })?;

    Ok(Identity::from(data.claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "test-secret";

    fn mint(secret: &str, exp_offset: i64, roles: &[&str]) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = Claims {
            sub: "user123".into(),
            username: "testuser".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iat: now,
            exp: now + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("failed to encode test JWT")
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            verify(None, SECRET),
            Err(AuthError::MissingCredential)
        ));
    }

    #[test]
    fn test_malformed_header() {
        for header in [
            "Bearer",
            "Bearer ",
            "Token abc123",
            "bearer abc123",
            "Bearer abc 123",
        ] {
            assert!(
                matches!(verify(Some(header), SECRET), Err(AuthError::MalformedCredential)),
                "expected MalformedCredential for {:?}",
                header
            );
        }
    }

    #[test]
    fn test_valid_token() {
        let token = mint(SECRET, 3600, &["user"]);
        let identity = verify(Some(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(identity.subject, "user123");
        assert_eq!(identity.username, "testuser");
        assert_eq!(identity.roles, vec!["user".to_string()]);
    }

    #[test]
    fn test_wrong_secret() {
        let token = mint("other-secret", 3600, &["user"]);
        assert!(matches!(
            verify(Some(&format!("Bearer {}", token)), SECRET),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            verify(Some("Bearer invalid.token.here"), SECRET),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_with_valid_signature() {
        let token = mint(SECRET, -3600, &["user"]);
        assert!(matches!(
            verify(Some(&format!("Bearer {}", token)), SECRET),
            Err(AuthError::Expired)
        ));
    }
}
