// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Remote key-value store access.
//!
//! All gating state (allow-list sets, join-request queues, KYC statuses,
//! rate-limit counters) lives in a Redis-compatible store reached over its
//! REST endpoint. Every operation is a single command round trip; there is
//! no batching, no pipelining and no retry — a failed command surfaces
//! immediately to the caller.
//!
//! ## Key Patterns
//!
//! ```text
//! wl:{chain_id}:{listing_id}       → set of lowercase addresses
//! wl:req:{chain_id}:{listing_id}   → list of join-request JSON records
//! kyc:{address}                    → "none" | "pending" | "approved"
//! rl:{bucket}                      → windowed counter with TTL
//! ```
//!
//! Two implementations exist: [`RestKv`] for the real remote store and
//! [`MemoryKv`], a process-local stand-in used by tests and as a development
//! fallback when no `KV_REST_URL` is configured.

mod memory;
mod rest;

pub use memory::MemoryKv;
pub use rest::RestKv;

use async_trait::async_trait;

/// Error type for remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// The request never produced a usable reply (network, TLS, timeout).
    #[error("kv transport error: {0}")]
    Transport(String),

    /// The store accepted the request but rejected the command.
    #[error("kv command error: {0}")]
    Command(String),

    /// The reply arrived but did not have the expected shape.
    #[error("kv unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Result type for remote store operations.
pub type KvResult<T> = Result<T, KvError>;

/// Minimal command surface the gating workflow needs.
///
/// Mirrors the Redis commands the service issues one-for-one, so that the
/// REST client stays a thin pass-through and the in-memory implementation
/// stays honest about semantics (TTLs, set membership, list ordering).
#[async_trait]
pub trait KvStore: Send + Sync {
    /// GET — `None` when the key is unset.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// SET — unconditional overwrite.
    async fn set(&self, key: &str, value: &str) -> KvResult<()>;

    /// DEL — returns the number of keys removed (0 or 1).
    async fn del(&self, key: &str) -> KvResult<u64>;

    /// INCR — creates the key at 1 when unset.
    async fn incr(&self, key: &str) -> KvResult<i64>;

    /// EXPIRE — returns false when the key does not exist.
    async fn expire(&self, key: &str, seconds: u64) -> KvResult<bool>;

    /// TTL — seconds remaining; -1 without expiry, -2 when the key is unset.
    async fn ttl(&self, key: &str) -> KvResult<i64>;

    /// SADD — returns the number of members actually added (0 or 1).
    async fn sadd(&self, key: &str, member: &str) -> KvResult<u64>;

    /// SREM — returns the number of members actually removed (0 or 1).
    async fn srem(&self, key: &str, member: &str) -> KvResult<u64>;

    /// SISMEMBER
    async fn sismember(&self, key: &str, member: &str) -> KvResult<bool>;

    /// SCARD — 0 when the key is unset.
    async fn scard(&self, key: &str) -> KvResult<u64>;

    /// SSCAN — returns `(next_cursor, members)`; a next cursor of 0 means
    /// the enumeration is complete.
    async fn sscan(&self, key: &str, cursor: u64, count: u64) -> KvResult<(u64, Vec<String>)>;

    /// RPUSH — returns the list length after the push.
    async fn rpush(&self, key: &str, value: &str) -> KvResult<u64>;

    /// LRANGE — inclusive range, Redis index semantics (-1 is the tail).
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> KvResult<Vec<String>>;
}
