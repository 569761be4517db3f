//! Credential verification subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization header
//!     → verifier.rs (scheme check, HMAC signature, expiry)
//!     → Identity (subject, username, roles)
//!     → request extensions, read by later pipeline stages
//! ```
//!
//! # Design Decisions
//! - Stateless: tokens are re-verified on every request, no sessions
//! - HS256 only; token issuance belongs to an external identity provider
//! - Role check is literal set membership, no hierarchy

pub mod identity;
pub mod middleware;
pub mod verifier;

pub use identity::{Claims, Identity};
pub use verifier::{verify, AuthError};
