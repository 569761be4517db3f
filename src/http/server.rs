//! HTTP server setup and pipeline wiring.
//!
//! # Responsibilities
//! - Create the Axum router with public, API and admin route groups
//! - Wire the per-request pipeline: authenticate → rate limit → role check →
//!   forward, short-circuiting on the first rejection
//! - Configure cross-cutting layers (CORS, timeout, tracing)
//! - Serve with graceful shutdown
//!
//! # Pipeline
//! ```text
//! /            public: no auth, no rate limit
//! /health      public: pings the counting store
//! /api/v1/*    authenticate → rate limit → forward to bound backend
//! /admin/*     authenticate → rate limit → require admin → handler
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, on},
    Extension, Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::middleware::{authenticate, require_admin};
use crate::auth::Identity;
use crate::config::{CorsConfig, GatewayConfig};
use crate::proxy::Forwarder;
use crate::ratelimit::limiter::unix_now;
use crate::ratelimit::middleware::rate_limit;
use crate::ratelimit::{SlidingWindow, WindowStore};
use crate::routing::{ProxyTarget, RouteTable};

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub limiter: Arc<SlidingWindow>,
    pub forwarder: Forwarder,
    pub started_at: Instant,
}

/// HTTP server for the API gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server from a validated config and a counting store.
    ///
    /// The store is injected so tests can run against an in-process
    /// implementation; production wires up Redis in `main`.
    pub fn new(config: GatewayConfig, store: Arc<dyn WindowStore>) -> Self {
        let limiter = Arc::new(SlidingWindow::new(
            store,
            config.rate_limit.requests_per_second,
            Duration::from_millis(config.store.command_timeout_ms),
        ));

        let state = AppState {
            config: Arc::new(config.clone()),
            limiter,
            forwarder: Forwarder::new(),
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all route groups and middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        // Public routes bypass authentication and rate limiting entirely.
        let public = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler));

        // Protected API routes: authenticate, then rate limit, then forward.
        // Layer order is outermost-last, so authenticate runs first and the
        // rate key can use the verified subject.
        let table = RouteTable::from_services(&config.services);
        let mut api = Router::new();
        for binding in table.bindings() {
            api = api.route(
                binding.path,
                on(binding.filter, proxy_handler).layer(Extension(binding.target.clone())),
            );
        }
        let api = api
            .route("/api/v1/workflows", get(workflows_handler))
            .layer(from_fn_with_state(state.clone(), rate_limit))
            .layer(from_fn_with_state(state.clone(), authenticate));

        // Admin routes additionally require the admin role.
        let admin = Router::new()
            .route("/admin/stats", get(admin_stats_handler))
            .layer(from_fn(require_admin))
            .layer(from_fn_with_state(state.clone(), rate_limit))
            .layer(from_fn_with_state(state.clone(), authenticate));

        Router::new()
            .merge(public)
            .merge(api)
            .merge(admin)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(cors_layer(&config.cors))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            budget_per_second = self.config.rate_limit.requests_per_second,
            "API gateway starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("API gateway stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Proxy handler for bound routes: forward to the backend attached to the
/// route and map failures to caller responses.
async fn proxy_handler(
    State(state): State<AppState>,
    Extension(target): Extension<ProxyTarget>,
    request: Request<Body>,
) -> Response {
    match state.forwarder.forward(request, &target.0).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Service banner.
async fn root_handler() -> Response {
    Json(json!({
        "service": "API Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "time": unix_now(),
    }))
    .into_response()
}

/// Health check: the gateway is healthy when the counting store answers.
async fn health_handler(State(state): State<AppState>) -> Response {
    match state.limiter.ping().await {
        Ok(()) => Json(json!({
            "status": "healthy",
            "store": "connected",
            "time": unix_now(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Counting store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "store": "disconnected",
                })),
            )
                .into_response()
        }
    }
}

/// Placeholder endpoint until a workflow service exists.
async fn workflows_handler(Extension(identity): Extension<Identity>) -> Response {
    Json(json!({
        "message": "Workflows endpoint",
        "user_id": identity.subject,
    }))
    .into_response()
}

/// Admin-only gateway statistics.
async fn admin_stats_handler(State(state): State<AppState>) -> Response {
    Json(json!({
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "timestamp": unix_now(),
    }))
    .into_response()
}

/// CORS policy from config. A single "*" origin allows any origin without
/// credentials; explicit origins get credentials support. `tower-http`
/// rejects the wildcard combined with `allow_credentials(true)` at layer
/// construction (the Fetch spec forbids the pair), so the wildcard path
/// deliberately leaves credentials off.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(86_400));

    if config.allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
