//! Static route bindings.
//!
//! # Responsibilities
//! - Bind inbound path + method to a backend base address
//! - Built once from config at startup, immutable thereafter
//!
//! # Design Decisions
//! - Full inbound paths are registered (no prefix stripping), so backends
//!   see the same path the caller sent
//! - Explicit bindings rather than wildcard prefixes: unknown API paths 404
//!   at the gateway instead of leaking to a backend

use std::sync::Arc;

use axum::routing::MethodFilter;

use crate::config::ServiceConfig;

/// Backend base address bound to a proxied route, attached to the route as
/// an axum extension.
#[derive(Clone)]
pub struct ProxyTarget(pub Arc<str>);

/// One inbound path bound to a backend.
pub struct RouteBinding {
    pub path: &'static str,
    pub filter: MethodFilter,
    pub target: ProxyTarget,
}

/// The gateway's static route table.
pub struct RouteTable {
    bindings: Vec<RouteBinding>,
}

impl RouteTable {
    /// Build the bindings for the configured downstream services.
    pub fn from_services(services: &ServiceConfig) -> Self {
        let ingestion: Arc<str> = Arc::from(services.ingestion_url.as_str());
        let indexing: Arc<str> = Arc::from(services.indexing_url.as_str());
        let agent: Arc<str> = Arc::from(services.agent_url.as_str());

        let bind = |path, filter, target: &Arc<str>| RouteBinding {
            path,
            filter,
            target: ProxyTarget(target.clone()),
        };

        Self {
            bindings: vec![
                // Ingestion service
                bind("/api/v1/ingest", MethodFilter::POST, &ingestion),
                bind("/api/v1/ingest/health", MethodFilter::GET, &ingestion),
                // Indexing service
                bind("/api/v1/index", MethodFilter::POST, &indexing),
                bind("/api/v1/index/batch", MethodFilter::POST, &indexing),
                bind("/api/v1/search", MethodFilter::POST, &indexing),
                bind("/api/v1/stats", MethodFilter::GET, &indexing),
                // Agent orchestrator
                bind("/api/v1/execute", MethodFilter::POST, &agent),
                bind("/api/v1/execute/{id}", MethodFilter::GET, &agent),
            ],
        }
    }

    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }
}
