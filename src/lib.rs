//! API gateway: authentication, rate limiting, and reverse proxying.
//!
//! Every inbound request passes through a fixed pipeline:
//!
//! ```text
//! request → authenticate (bearer JWT, HS256)
//!         → admit (sliding 1-second window, Redis-backed)
//!         → [require admin role]
//!         → forward (byte-faithful reverse proxy)
//! ```
//!
//! Each stage may terminate the request with a structured JSON error; the
//! first rejection wins and later stages observably never run.

pub mod auth;
pub mod config;
pub mod http;
pub mod proxy;
pub mod ratelimit;
pub mod routing;

pub use config::GatewayConfig;
pub use http::GatewayServer;
