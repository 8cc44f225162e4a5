// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Windowed rate limiting against the remote store.
//!
//! INCR the bucket counter, set the window TTL on the first hit, allow while
//! the counter stays at or under the limit. Two concurrent first hits can
//! both observe a fresh counter and both issue EXPIRE; the window just gets
//! set twice, which is fine for coarse abuse throttling.

use crate::kv::{KvResult, KvStore};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the call is within the window's budget.
    pub allowed: bool,
    /// Counter value after this call.
    pub current: i64,
    /// Seconds until the window resets. Only populated on rejection.
    pub retry_after_secs: Option<i64>,
}

/// Counter-based rate limiter keyed by arbitrary bucket strings.
pub struct RateLimiter<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> RateLimiter<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    fn key(bucket: &str) -> String {
        format!("rl:{bucket}")
    }

    /// Count a call against `bucket` and decide whether it is allowed.
    ///
    /// Exactly `limit` calls pass per window; the next one is rejected until
    /// the TTL lapses and the counter disappears.
    pub async fn check(&self, bucket: &str, limit: i64, window_secs: u64) -> KvResult<RateDecision> {
        let key = Self::key(bucket);
        let current = self.kv.incr(&key).await?;
        if current == 1 {
            self.kv.expire(&key, window_secs).await?;
        }

        if current <= limit {
            Ok(RateDecision {
                allowed: true,
                current,
                retry_after_secs: None,
            })
        } else {
            let ttl = self.kv.ttl(&key).await?;
            Ok(RateDecision {
                allowed: false,
                current,
                retry_after_secs: (ttl > 0).then_some(ttl),
            })
        }
    }
}
