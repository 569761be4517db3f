//! HTTP subsystem: server wiring and response helpers.

pub mod response;
pub mod server;

pub use server::{AppState, GatewayServer};
