//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted request
//!     → forwarder.rs (rebuild URI, copy headers, enrich identity)
//!     → hyper client (single attempt)
//!     → backend response streamed back verbatim
//! ```

pub mod forwarder;

pub use forwarder::{Forwarder, ProxyError};
