//! Verified caller identity and token claims.

use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token.
///
/// Issued by an external identity provider; the gateway only verifies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier.
    pub sub: String,

    /// Display name.
    pub username: String,

    /// Role strings. Absent roles mean no privileges, not an error.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expires-at, unix seconds.
    pub exp: i64,
}

/// The verified result of a credential, valid for one request.
///
/// Attached to the request's extensions by the authentication middleware and
/// read by later stages (role check, rate-key selection, forwarding).
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Literal set membership check. An empty role set rejects everything.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            username: claims.username,
            roles: claims.roles,
        }
    }
}
