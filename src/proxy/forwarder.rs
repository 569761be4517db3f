//! Request forwarding to downstream services.
//!
//! # Responsibilities
//! - Rebuild the admitted request against the bound backend address
//! - Copy inbound headers, rewrite Host to the backend authority, add
//!   identity enrichment headers
//! - Stream the backend response back without buffering the body
//!
//! # Design Decisions
//! - Single attempt per inbound request, transport-default timeout
//! - Body streams in both directions; dropping the handler future on caller
//!   disconnect aborts the outbound call
//! - Backend error detail is logged, never echoed to the caller

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::auth::Identity;
use crate::http::response::json_error;

/// Forwarding failure kinds.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to build proxy request: {0}")]
    Construction(#[from] axum::http::Error),

    #[error("backend unreachable: {0}")]
    BackendUnreachable(#[from] hyper_util::client::legacy::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Construction(_) => json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to create proxy request",
            ),
            ProxyError::BackendUnreachable(_) => json_error(
                StatusCode::BAD_GATEWAY,
                "failed to reach downstream service",
            ),
        }
    }
}

/// Forwards admitted requests to backend base addresses.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}

impl Forwarder {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }

    /// Reproduce `request` against `target_base` and stream back the
    /// response verbatim.
    pub async fn forward(
        &self,
        request: Request<Body>,
        target_base: &str,
    ) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let identity = parts.extensions.get::<Identity>().cloned();

        let uri = build_target_uri(target_base, parts.uri.path(), parts.uri.query())?;

        let mut outbound = Request::builder()
            .method(parts.method.clone())
            .uri(uri.clone())
            .body(body)?;

        // All inbound headers travel unmodified, except Host: the outbound
        // request must carry the backend's authority, which the client fills
        // in from the URI once the inbound value is gone.
        *outbound.headers_mut() = parts.headers.clone();
        outbound.headers_mut().remove(header::HOST);

        // Enrichment: the backend receives the verified identity and must
        // only trust these headers when the request came through the gateway.
        if let Some(identity) = &identity {
            if let Ok(value) = HeaderValue::from_str(&identity.subject) {
                outbound.headers_mut().insert("x-user-id", value);
            }
            if let Ok(value) = HeaderValue::from_str(&identity.username) {
                outbound.headers_mut().insert("x-username", value);
            }
        }

        let response: axum::http::Response<hyper::body::Incoming> = self
            .client
            .request(outbound)
            .await
            .map_err(|e| {
                tracing::error!(target = %uri, error = %e, "Backend unreachable");
                ProxyError::BackendUnreachable(e)
            })?;

        // Status and headers verbatim; the body streams through.
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Outbound address: target base plus the inbound path (unless the base
/// already ends with it) plus the original query string verbatim.
fn build_target_uri(
    target_base: &str,
    path: &str,
    query: Option<&str>,
) -> Result<Uri, axum::http::Error> {
    let mut url = String::with_capacity(
        target_base.len() + path.len() + query.map(|q| q.len() + 1).unwrap_or(0),
    );
    url.push_str(target_base);
    if !target_base.ends_with(path) {
        url.push_str(path);
    }
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }
    url.parse::<Uri>().map_err(axum::http::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_plus_path() {
        let uri = build_target_uri("http://localhost:8001", "/api/v1/ingest", None).unwrap();
        assert_eq!(uri.to_string(), "http://localhost:8001/api/v1/ingest");
    }

    #[test]
    fn test_base_already_ending_with_path() {
        let uri = build_target_uri("http://localhost:8001/api/v1/ingest", "/api/v1/ingest", None)
            .unwrap();
        assert_eq!(uri.to_string(), "http://localhost:8001/api/v1/ingest");
    }

    #[test]
    fn test_query_string_preserved_verbatim() {
        let uri = build_target_uri(
            "http://localhost:8003",
            "/api/v1/search",
            Some("q=embedding%20model&limit=10"),
        )
        .unwrap();
        assert_eq!(
            uri.to_string(),
            "http://localhost:8003/api/v1/search?q=embedding%20model&limit=10"
        );
    }

    #[test]
    fn test_malformed_base_is_a_construction_error() {
        assert!(build_target_uri("http://exa mple", "/x", None).is_err());
    }
}
