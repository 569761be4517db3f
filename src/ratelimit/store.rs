//! Counting-store backends for the sliding window.
//!
//! # Responsibilities
//! - Keep one ordered collection of admitted-request entries per rate key
//! - Prune, count and record entries; expire idle keys
//!
//! # Design Decisions
//! - Per-command atomicity is the unit of correctness; no cross-command
//!   transactions (the limiter is soft by design)
//! - Store failures are surfaced, never swallowed: admission must not fail
//!   open on a store outage
//! - Trait seam so tests run against an in-process store

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;

/// Counting-store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("store round trip timed out")]
    Timeout,
}

/// One ordered collection of window entries per rate key.
///
/// Scores are unix seconds; members are opaque unique strings that
/// disambiguate bursts within the same second.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Remove all entries for `key` with score at or below `cutoff`.
    async fn prune(&self, key: &str, cutoff: i64) -> Result<(), StoreError>;

    /// Count the entries currently recorded for `key`.
    async fn count(&self, key: &str) -> Result<u64, StoreError>;

    /// Record one entry and refresh the key's expiry.
    async fn record(
        &self,
        key: &str,
        timestamp: i64,
        member: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Liveness probe, used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Redis-backed window store using a sorted set per rate key.
///
/// `ConnectionManager` multiplexes one connection and reconnects on failure;
/// clones share the underlying connection.
#[derive(Clone)]
pub struct RedisWindowStore {
    conn: ConnectionManager,
}

impl RedisWindowStore {
    /// Connect to Redis and verify the connection with a ping.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl WindowStore for RedisWindowStore {
    async fn prune(&self, key: &str, cutoff: i64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: u64 = conn.zrembyscore(key, 0, cutoff).await?;
        Ok(())
    }

    async fn count(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        Ok(conn.zcard(key).await?)
    }

    async fn record(
        &self,
        key: &str,
        timestamp: i64,
        member: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: u64 = conn.zadd(key, member, timestamp).await?;
        let _: bool = conn.expire(key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// In-process window store for tests and store-less development.
///
/// Entry TTLs are not enforced; pruning keeps the per-key collections
/// bounded, which is all the limiter semantics require.
#[derive(Default)]
pub struct MemoryWindowStore {
    entries: Mutex<HashMap<String, Vec<(i64, String)>>>,
}

impl MemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries across all keys. Lets tests assert that admission was
    /// never invoked.
    pub fn total_entries(&self) -> usize {
        self.entries
            .lock()
            .expect("window store mutex poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

#[async_trait]
impl WindowStore for MemoryWindowStore {
    async fn prune(&self, key: &str, cutoff: i64) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("window store mutex poisoned");
        if let Some(window) = entries.get_mut(key) {
            window.retain(|(score, _)| *score > cutoff);
            if window.is_empty() {
                entries.remove(key);
            }
        }
        Ok(())
    }

    async fn count(&self, key: &str) -> Result<u64, StoreError> {
        let entries = self.entries.lock().expect("window store mutex poisoned");
        Ok(entries.get(key).map(|w| w.len() as u64).unwrap_or(0))
    }

    async fn record(
        &self,
        key: &str,
        timestamp: i64,
        member: &str,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("window store mutex poisoned");
        entries
            .entry(key.to_string())
            .or_default()
            .push((timestamp, member.to_string()));
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
