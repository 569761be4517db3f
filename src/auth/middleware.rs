//! Authentication and role-check middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::identity::Identity;
use crate::auth::verifier::{self, AuthError};
use crate::http::response::json_error;
use crate::http::server::AppState;

/// Verify the bearer credential and attach the resulting [`Identity`] to the
/// request. Any failure terminates the request with 401 before later stages
/// run.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // A header that is present but not valid UTF-8 is malformed, not absent.
    let result = match request.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(value) => verifier::verify(Some(value), &state.config.auth.jwt_secret),
            Err(_) => Err(AuthError::MalformedCredential),
        },
        None => verifier::verify(None, &state.config.auth.jwt_secret),
    };

    match result {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            // Expired vs forged is interesting for diagnostics even though
            // callers see the same response.
            tracing::debug!(path = %request.uri().path(), error = %e, "Authentication rejected");
            e.into_response()
        }
    }
}

/// Require the `admin` role on the verified identity. Runs after
/// [`authenticate`]; a missing identity or role set is a rejection.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let authorized = request
        .extensions()
        .get::<Identity>()
        .map(|identity| identity.has_role("admin"))
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "Admin role missing");
        json_error(StatusCode::FORBIDDEN, "admin access required")
    }
}
