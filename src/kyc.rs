// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! KYC status store.
//!
//! One current status per wallet address, keyed case-insensitively. Any
//! status may overwrite any other; no transition rules and no history.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::address::normalize_address;
use crate::kv::{KvResult, KvStore};

/// KYC verification status. Closed three-value set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// No verification on record (the default for unknown addresses).
    #[default]
    None,
    /// Verification submitted, awaiting review.
    Pending,
    /// Verification approved.
    Approved,
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KycStatus::None => "none",
            KycStatus::Pending => "pending",
            KycStatus::Approved => "approved",
        };
        f.write_str(s)
    }
}

impl FromStr for KycStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(KycStatus::None),
            "pending" => Ok(KycStatus::Pending),
            "approved" => Ok(KycStatus::Approved),
            _ => Err(()),
        }
    }
}

/// Store for per-address KYC statuses.
pub struct KycStore<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> KycStore<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    fn key(address: &str) -> String {
        format!("kyc:{}", normalize_address(address))
    }

    /// Current status for an address, `None` when nothing is on record.
    ///
    /// An unrecognized stored value also reads as `None` rather than
    /// failing; the status set is closed, so this only happens if the key
    /// was written outside this service.
    pub async fn get(&self, address: &str) -> KvResult<KycStatus> {
        let raw = self.kv.get(&Self::key(address)).await?;
        Ok(raw
            .and_then(|s| s.parse().ok())
            .unwrap_or(KycStatus::None))
    }

    /// Set the status for an address, overwriting any previous value.
    pub async fn set(&self, address: &str, status: KycStatus) -> KvResult<()> {
        self.kv.set(&Self::key(address), &status.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    const ADDR: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[tokio::test]
    async fn unknown_address_reads_as_none() {
        let kv = MemoryKv::new();
        let store = KycStore::new(&kv);
        assert_eq!(store.get(ADDR).await.unwrap(), KycStatus::None);
    }

    #[tokio::test]
    async fn set_then_get_roundtrips_every_status() {
        let kv = MemoryKv::new();
        let store = KycStore::new(&kv);

        for status in [KycStatus::None, KycStatus::Pending, KycStatus::Approved] {
            store.set(ADDR, status).await.unwrap();
            assert_eq!(store.get(ADDR).await.unwrap(), status);
        }
    }

    #[tokio::test]
    async fn any_status_may_overwrite_any_other() {
        let kv = MemoryKv::new();
        let store = KycStore::new(&kv);

        store.set(ADDR, KycStatus::Approved).await.unwrap();
        store.set(ADDR, KycStatus::Pending).await.unwrap();
        assert_eq!(store.get(ADDR).await.unwrap(), KycStatus::Pending);
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let kv = MemoryKv::new();
        let store = KycStore::new(&kv);

        store.set(ADDR, KycStatus::Approved).await.unwrap();
        assert_eq!(
            store.get(&ADDR.to_ascii_lowercase()).await.unwrap(),
            KycStatus::Approved
        );
    }

    #[tokio::test]
    async fn unrecognized_stored_value_reads_as_none() {
        let kv = MemoryKv::new();
        kv.set(&KycStore::key(ADDR), "verified").await.unwrap();

        let store = KycStore::new(&kv);
        assert_eq!(store.get(ADDR).await.unwrap(), KycStatus::None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&KycStatus::Approved).unwrap(),
            r#""approved""#
        );
        assert_eq!(
            serde_json::from_str::<KycStatus>(r#""pending""#).unwrap(),
            KycStatus::Pending
        );
        assert!(serde_json::from_str::<KycStatus>(r#""rejected""#).is_err());
    }
}
