// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! REST client for the remote key-value store.
//!
//! The store exposes a Redis-over-REST endpoint: each command is POSTed as a
//! JSON array (`["SADD", "wl:137:lst_1", "0xabc…"]`) with a bearer token,
//! and the reply is `{"result": …}` on success or `{"error": "…"}` when the
//! command is rejected.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{KvError, KvResult, KvStore};

/// Per-command request timeout. The gating routes do one or two commands per
/// request, so a stuck store should fail the HTTP request quickly rather
/// than hold the connection open.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// REST-backed [`KvStore`] implementation.
#[derive(Debug, Clone)]
pub struct RestKv {
    base_url: String,
    token: String,
    http: Client,
}

impl RestKv {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> KvResult<Self> {
        let http = Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(|e| KvError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }

    /// Issue a single command and return the raw `result` payload.
    async fn command(&self, cmd: &[&str]) -> KvResult<Value> {
        let response = self
            .http
            .post(self.base_url.as_str())
            .bearer_auth(&self.token)
            .json(&json!(cmd))
            .send()
            .await
            .map_err(|e| KvError::Transport(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| KvError::UnexpectedReply(format!("non-JSON reply: {e}")))?;

        if let Some(err) = body.get("error").and_then(Value::as_str) {
            return Err(KvError::Command(err.to_string()));
        }
        if !status.is_success() {
            return Err(KvError::Transport(format!("store replied with {status}")));
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| KvError::UnexpectedReply(format!("missing result field in {body}")))
    }
}

fn expect_int(value: Value) -> KvResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| KvError::UnexpectedReply(format!("expected integer, got {value}")))
}

fn expect_string_array(value: Value) -> KvResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| KvError::UnexpectedReply(format!("expected array, got {value}")))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| KvError::UnexpectedReply(format!("expected string element, got {v}")))
        })
        .collect()
}

#[async_trait]
impl KvStore for RestKv {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        match self.command(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(KvError::UnexpectedReply(format!(
                "expected string or null, got {other}"
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.command(&["SET", key, value]).await.map(|_| ())
    }

    async fn del(&self, key: &str) -> KvResult<u64> {
        expect_int(self.command(&["DEL", key]).await?).map(|n| n.max(0) as u64)
    }

    async fn incr(&self, key: &str) -> KvResult<i64> {
        expect_int(self.command(&["INCR", key]).await?)
    }

    async fn expire(&self, key: &str, seconds: u64) -> KvResult<bool> {
        let secs = seconds.to_string();
        expect_int(self.command(&["EXPIRE", key, &secs]).await?).map(|n| n == 1)
    }

    async fn ttl(&self, key: &str) -> KvResult<i64> {
        expect_int(self.command(&["TTL", key]).await?)
    }

    async fn sadd(&self, key: &str, member: &str) -> KvResult<u64> {
        expect_int(self.command(&["SADD", key, member]).await?).map(|n| n.max(0) as u64)
    }

    async fn srem(&self, key: &str, member: &str) -> KvResult<u64> {
        expect_int(self.command(&["SREM", key, member]).await?).map(|n| n.max(0) as u64)
    }

    async fn sismember(&self, key: &str, member: &str) -> KvResult<bool> {
        expect_int(self.command(&["SISMEMBER", key, member]).await?).map(|n| n == 1)
    }

    async fn scard(&self, key: &str) -> KvResult<u64> {
        expect_int(self.command(&["SCARD", key]).await?).map(|n| n.max(0) as u64)
    }

    async fn sscan(&self, key: &str, cursor: u64, count: u64) -> KvResult<(u64, Vec<String>)> {
        let cursor = cursor.to_string();
        let count = count.to_string();
        let reply = self
            .command(&["SSCAN", key, &cursor, "COUNT", &count])
            .await?;

        // SSCAN replies with a two-element array: [next_cursor, members].
        // The cursor comes back as a string.
        let parts = reply
            .as_array()
            .filter(|a| a.len() == 2)
            .ok_or_else(|| KvError::UnexpectedReply(format!("malformed SSCAN reply: {reply}")))?;

        let next_cursor = parts[0]
            .as_str()
            .and_then(|s| s.parse::<u64>().ok())
            .or_else(|| parts[0].as_u64())
            .ok_or_else(|| KvError::UnexpectedReply(format!("bad SSCAN cursor: {}", parts[0])))?;

        let members = expect_string_array(parts[1].clone())?;
        Ok((next_cursor, members))
    }

    async fn rpush(&self, key: &str, value: &str) -> KvResult<u64> {
        expect_int(self.command(&["RPUSH", key, value]).await?).map(|n| n.max(0) as u64)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> KvResult<Vec<String>> {
        let start = start.to_string();
        let stop = stop.to_string();
        expect_string_array(self.command(&["LRANGE", key, &start, &stop]).await?)
    }
}
