//! Routing subsystem.
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same path and method always hit the same backend
//! - No regex; exact axum path templates only

pub mod table;

pub use table::{ProxyTarget, RouteBinding, RouteTable};
