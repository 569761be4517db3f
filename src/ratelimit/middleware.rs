//! Rate limiting middleware.
//!
//! Attaches `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
//! `X-RateLimit-Reset` headers on every response from a rate-limited route,
//! including the 429 rejection.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::Identity;
use crate::http::response::json_error;
use crate::http::server::AppState;
use crate::ratelimit::limiter::Decision;

/// Run the admission check for this request and short-circuit with 429 when
/// the budget is exhausted.
///
/// The rate key is the verified identity's subject when the authentication
/// stage ran first, and the peer address otherwise.
pub async fn rate_limit(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let rate_key = match request.extensions().get::<Identity>() {
        Some(identity) => identity.subject.clone(),
        None => addr.ip().to_string(),
    };

    let decision = match state.limiter.admit(&rate_key).await {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(rate_key = %rate_key, error = %e, "Admission check failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "rate limit check failed");
        }
    };

    if !decision.allowed {
        tracing::warn!(rate_key = %rate_key, limit = decision.limit, "Rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "rate limit exceeded",
                "retry_after": 1,
            })),
        )
            .into_response();
        apply_headers(response.headers_mut(), &decision);
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: &Decision) {
    headers.insert("x-ratelimit-limit", int_header(decision.limit as i64));
    headers.insert("x-ratelimit-remaining", int_header(decision.remaining as i64));
    headers.insert("x-ratelimit-reset", int_header(decision.reset_at_unix));
}

fn int_header(value: i64) -> HeaderValue {
    // Decimal integers are always valid header values.
    HeaderValue::from_str(&value.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}
