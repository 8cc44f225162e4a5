// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Process-local key-value store.
//!
//! Implements the same command semantics as the remote store, including
//! per-key expiry, against plain in-process collections. Used by tests and
//! as the development fallback when `KV_REST_URL` is not configured. State
//! does not survive a restart.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{KvError, KvResult, KvStore};

enum Value {
    Str(String),
    Set(BTreeSet<String>),
    List(Vec<String>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory [`KvStore`] implementation.
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` against the live (non-expired) entry map.
    ///
    /// Expired keys are purged lazily on access, matching how callers would
    /// observe them against the remote store.
    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, Entry>) -> T) -> T {
        let mut entries = self.entries.lock().expect("kv mutex poisoned");
        entries.retain(|_, entry| !entry.expired());
        f(&mut entries)
    }

    fn wrong_type(key: &str) -> KvError {
        KvError::Command(format!(
            "WRONGTYPE operation against key {key} holding the wrong kind of value"
        ))
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.with_entries(|entries| match entries.get(key) {
            None => Ok(None),
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s.clone())),
            Some(_) => Err(Self::wrong_type(key)),
        })
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.with_entries(|entries| {
            entries.insert(
                key.to_string(),
                Entry {
                    value: Value::Str(value.to_string()),
                    expires_at: None,
                },
            );
            Ok(())
        })
    }

    async fn del(&self, key: &str) -> KvResult<u64> {
        self.with_entries(|entries| Ok(entries.remove(key).map_or(0, |_| 1)))
    }

    async fn incr(&self, key: &str) -> KvResult<i64> {
        self.with_entries(|entries| {
            let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
                value: Value::Str("0".to_string()),
                expires_at: None,
            });
            match &mut entry.value {
                Value::Str(s) => {
                    let n: i64 = s
                        .parse()
                        .map_err(|_| {
                            KvError::Command(format!("value at {key} is not an integer"))
                        })?;
                    let n = n + 1;
                    *s = n.to_string();
                    Ok(n)
                }
                _ => Err(Self::wrong_type(key)),
            }
        })
    }

    async fn expire(&self, key: &str, seconds: u64) -> KvResult<bool> {
        self.with_entries(|entries| match entries.get_mut(key) {
            None => Ok(false),
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + Duration::from_secs(seconds));
                Ok(true)
            }
        })
    }

    async fn ttl(&self, key: &str) -> KvResult<i64> {
        self.with_entries(|entries| match entries.get(key) {
            None => Ok(-2),
            Some(Entry {
                expires_at: None, ..
            }) => Ok(-1),
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => {
                let remaining = at.saturating_duration_since(Instant::now());
                // Round up so a key with 0.5s left still reports 1.
                Ok(remaining.as_secs_f64().ceil() as i64)
            }
        })
    }

    async fn sadd(&self, key: &str, member: &str) -> KvResult<u64> {
        self.with_entries(|entries| {
            let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
                value: Value::Set(BTreeSet::new()),
                expires_at: None,
            });
            match &mut entry.value {
                Value::Set(set) => Ok(u64::from(set.insert(member.to_string()))),
                _ => Err(Self::wrong_type(key)),
            }
        })
    }

    async fn srem(&self, key: &str, member: &str) -> KvResult<u64> {
        self.with_entries(|entries| match entries.get_mut(key) {
            None => Ok(0),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => Ok(u64::from(set.remove(member))),
            Some(_) => Err(Self::wrong_type(key)),
        })
    }

    async fn sismember(&self, key: &str, member: &str) -> KvResult<bool> {
        self.with_entries(|entries| match entries.get(key) {
            None => Ok(false),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => Ok(set.contains(member)),
            Some(_) => Err(Self::wrong_type(key)),
        })
    }

    async fn scard(&self, key: &str) -> KvResult<u64> {
        self.with_entries(|entries| match entries.get(key) {
            None => Ok(0),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => Ok(set.len() as u64),
            Some(_) => Err(Self::wrong_type(key)),
        })
    }

    async fn sscan(&self, key: &str, cursor: u64, count: u64) -> KvResult<(u64, Vec<String>)> {
        // Redis rejects COUNT 0 outright.
        if count == 0 {
            return Err(KvError::Command("syntax error in SSCAN".to_string()));
        }
        self.with_entries(|entries| match entries.get(key) {
            None => Ok((0, Vec::new())),
            Some(Entry {
                value: Value::Set(set),
                ..
            }) => {
                // BTreeSet iteration is ordered, so a plain offset works as
                // a stable cursor here.
                let offset = cursor as usize;
                let page: Vec<String> = set
                    .iter()
                    .skip(offset)
                    .take(count as usize)
                    .cloned()
                    .collect();
                let next = offset + page.len();
                let next_cursor = if next >= set.len() { 0 } else { next as u64 };
                Ok((next_cursor, page))
            }
            Some(_) => Err(Self::wrong_type(key)),
        })
    }

    async fn rpush(&self, key: &str, value: &str) -> KvResult<u64> {
        self.with_entries(|entries| {
            let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
                value: Value::List(Vec::new()),
                expires_at: None,
            });
            match &mut entry.value {
                Value::List(list) => {
                    list.push(value.to_string());
                    Ok(list.len() as u64)
                }
                _ => Err(Self::wrong_type(key)),
            }
        })
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> KvResult<Vec<String>> {
        self.with_entries(|entries| match entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry {
                value: Value::List(list),
                ..
            }) => {
                // Resolve negative indices against the tail before clamping;
                // a stop that resolves before the head is an empty range, not
                // index 0.
                let len = list.len() as i64;
                let resolve = |i: i64| if i < 0 { len + i } else { i };
                let start = resolve(start).max(0);
                let stop = resolve(stop);
                if stop < 0 || start > stop || start >= len {
                    return Ok(Vec::new());
                }
                let stop = stop.min(len - 1) as usize;
                Ok(list[start as usize..=stop].to_vec())
            }
            Some(_) => Err(Self::wrong_type(key)),
        })
    }
}
