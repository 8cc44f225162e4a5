// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Allow-list store.
//!
//! Each `(listing, chain)` pair owns two keys in the remote store: a set of
//! approved lowercase addresses and a list of pending join requests. The two
//! are independent — approving an address does not consume its request, and
//! the request queue is append-only with no dedup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::address::normalize_address;
use crate::kv::{KvResult, KvStore};

/// A pending request to join a listing's allow-list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Request identifier (UUID), assigned server-side.
    pub id: String,
    /// Requesting wallet address (lowercase).
    pub address: String,
    /// Contact email supplied with the request.
    pub email: String,
    /// When the request was received.
    pub requested_at: DateTime<Utc>,
}

impl JoinRequest {
    pub fn new(address: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            address: normalize_address(address),
            email: email.to_string(),
            requested_at: Utc::now(),
        }
    }
}

/// One page of an allow-list enumeration.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPage {
    /// Cursor for the next page; 0 means the enumeration is complete.
    pub cursor: u64,
    /// Addresses in this page.
    pub addresses: Vec<String>,
}

/// Store for allow-list members and join requests.
pub struct AllowlistStore<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> AllowlistStore<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    fn members_key(listing_id: &str, chain_id: u64) -> String {
        format!("wl:{chain_id}:{listing_id}")
    }

    fn requests_key(listing_id: &str, chain_id: u64) -> String {
        format!("wl:req:{chain_id}:{listing_id}")
    }

    /// Add an address. Returns true when it was not already a member.
    pub async fn add(&self, listing_id: &str, chain_id: u64, address: &str) -> KvResult<bool> {
        let key = Self::members_key(listing_id, chain_id);
        let added = self.kv.sadd(&key, &normalize_address(address)).await?;
        Ok(added == 1)
    }

    /// Remove an address. Returns true when it was a member.
    pub async fn remove(&self, listing_id: &str, chain_id: u64, address: &str) -> KvResult<bool> {
        let key = Self::members_key(listing_id, chain_id);
        let removed = self.kv.srem(&key, &normalize_address(address)).await?;
        Ok(removed == 1)
    }

    /// Check membership.
    pub async fn has(&self, listing_id: &str, chain_id: u64, address: &str) -> KvResult<bool> {
        let key = Self::members_key(listing_id, chain_id);
        self.kv.sismember(&key, &normalize_address(address)).await
    }

    /// Number of approved addresses.
    pub async fn count(&self, listing_id: &str, chain_id: u64) -> KvResult<u64> {
        self.kv.scard(&Self::members_key(listing_id, chain_id)).await
    }

    /// One page of members starting at `cursor`.
    pub async fn members(
        &self,
        listing_id: &str,
        chain_id: u64,
        cursor: u64,
        count: u64,
    ) -> KvResult<MemberPage> {
        let key = Self::members_key(listing_id, chain_id);
        let (cursor, addresses) = self.kv.sscan(&key, cursor, count).await?;
        Ok(MemberPage { cursor, addresses })
    }

    /// Drop the whole allow-list for a listing. The join-request queue is
    /// left untouched.
    pub async fn clear(&self, listing_id: &str, chain_id: u64) -> KvResult<()> {
        self.kv.del(&Self::members_key(listing_id, chain_id)).await?;
        Ok(())
    }

    /// Append a join request to the listing's queue.
    pub async fn push_request(
        &self,
        listing_id: &str,
        chain_id: u64,
        request: &JoinRequest,
    ) -> KvResult<()> {
        let key = Self::requests_key(listing_id, chain_id);
        let record = serde_json::to_string(request)
            .map_err(|e| crate::kv::KvError::UnexpectedReply(e.to_string()))?;
        self.kv.rpush(&key, &record).await?;
        Ok(())
    }

    /// All pending join requests for a listing, oldest first.
    ///
    /// Records that fail to parse are skipped rather than failing the whole
    /// read; a malformed entry in the queue should not hide the rest.
    pub async fn requests(&self, listing_id: &str, chain_id: u64) -> KvResult<Vec<JoinRequest>> {
        let key = Self::requests_key(listing_id, chain_id);
        let raw = self.kv.lrange(&key, 0, -1).await?;
        Ok(raw
            .iter()
            .filter_map(|record| match serde_json::from_str(record) {
                Ok(request) => Some(request),
                Err(e) => {
                    tracing::warn!("Skipping malformed join request in {key}: {e}");
                    None
                }
            })
            .collect())
    }
}
