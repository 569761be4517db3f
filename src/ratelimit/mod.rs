//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (after authentication)
//!     → middleware.rs (pick rate key: subject or peer IP)
//!     → limiter.rs (prune → count → record, 1-second window)
//!     → store.rs (Redis sorted set, or in-process map for tests)
//!     → Decision {allowed, limit, remaining, reset}
//! ```
//!
//! # Design Decisions
//! - Soft sliding window: per-command atomicity only, races between
//!   concurrent checks on one key are tolerated
//! - Fail closed: store outages deny the request with a server error
//! - No in-process locks around the store; coordination is delegated to the
//!   store's own command atomicity

pub mod limiter;
pub mod middleware;
pub mod store;

pub use limiter::{AdmissionError, Decision, SlidingWindow};
pub use store::{MemoryWindowStore, RedisWindowStore, StoreError, WindowStore};
