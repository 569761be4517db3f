//! Sliding-window admission control.
//!
//! # Responsibilities
//! - Decide admit/reject for one rate key against a per-second budget
//! - Maintain the trailing 1-second window in the counting store
//! - Expose decision metadata for the X-RateLimit-* response headers
//!
//! # Design Decisions
//! - Exact sliding window: prune entries at or before `now - 1`, count,
//!   record only on admission — a half-open `(windowStart, now]` interval
//! - Soft limiter: prune/count/record are separate store commands, so two
//!   concurrent requests on one key may both read the same count; small
//!   transient over-admission is accepted
//! - Fail closed: a store failure surfaces as `AdmissionUnavailable` and the
//!   request is denied with a server error, never silently admitted
//! - Every store round trip is bounded by a sub-second timeout

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::ratelimit::store::{StoreError, WindowStore};

/// Window length. The budget is expressed per this interval.
const WINDOW: Duration = Duration::from_secs(1);

/// Key TTL, slightly longer than the window so idle keys self-clean.
const KEY_TTL: Duration = Duration::from_secs(2);

/// Admission failure. Rate-limit rejections are not errors; they are
/// [`Decision`]s with `allowed == false` so the metadata travels with them.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("admission store unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_unix: i64,
}

/// Sliding-window rate limiter over a shared counting store.
pub struct SlidingWindow {
    store: Arc<dyn WindowStore>,
    budget_per_second: u32,
    command_timeout: Duration,
    /// Disambiguates entries recorded within the same nanosecond read.
    sequence: AtomicU64,
}

impl SlidingWindow {
    pub fn new(store: Arc<dyn WindowStore>, budget_per_second: u32, command_timeout: Duration) -> Self {
        Self {
            store,
            budget_per_second,
            command_timeout,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget_per_second
    }

    /// Store key for a rate key. One independent budget per key.
    pub fn store_key(rate_key: &str) -> String {
        format!("rate_limit:{}", rate_key)
    }

    /// Run one admission check for `rate_key`.
    pub async fn admit(&self, rate_key: &str) -> Result<Decision, AdmissionError> {
        let key = Self::store_key(rate_key);
        let now = unix_now();
        let window_start = now - WINDOW.as_secs() as i64;

        self.bounded(self.store.prune(&key, window_start)).await?;
        let count = self.bounded(self.store.count(&key)).await?;

        if count >= self.budget_per_second as u64 {
            return Ok(Decision {
                allowed: false,
                limit: self.budget_per_second,
                remaining: 0,
                reset_at_unix: now + 1,
            });
        }

        let member = self.unique_member();
        self.bounded(self.store.record(&key, now, &member, KEY_TTL))
            .await?;

        Ok(Decision {
            allowed: true,
            limit: self.budget_per_second,
            remaining: self.budget_per_second - count as u32 - 1,
            reset_at_unix: now + 1,
        })
    }

    /// Probe the counting store.
    pub async fn ping(&self) -> Result<(), AdmissionError> {
        self.bounded(self.store.ping()).await?;
        Ok(())
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Member strings must never collide within a key: nanosecond wall clock
    /// plus a process-wide counter.
    fn unique_member(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}:{}", nanos, seq)
    }
}

/// Current unix time in whole seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
