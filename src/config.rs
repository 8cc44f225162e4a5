// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `KV_REST_URL` | Remote key-value store REST endpoint | In-memory fallback |
//! | `KV_REST_TOKEN` | Bearer token for the store endpoint | Required with URL |
//! | `ADMIN_API_TOKEN` | Static token for admin routes (`x-admin-token`) | Admin routes disabled |
//! | `DEFAULT_CHAIN_ID` | Chain ID assumed when requests omit one | `137` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use url::Url;

/// Environment variable name for the remote store REST endpoint.
pub const KV_REST_URL_ENV: &str = "KV_REST_URL";

/// Environment variable name for the remote store bearer token.
pub const KV_REST_TOKEN_ENV: &str = "KV_REST_TOKEN";

/// Environment variable name for the static admin token.
pub const ADMIN_API_TOKEN_ENV: &str = "ADMIN_API_TOKEN";

/// Chain ID used when requests omit `chainId` (Polygon mainnet).
pub const DEFAULT_CHAIN_ID: u64 = 137;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not a valid URL: {1}")]
    InvalidUrl(&'static str, String),

    #[error("{0} is set but {1} is missing")]
    MissingCompanion(&'static str, &'static str),

    #[error("{0} is not a valid number: {1}")]
    InvalidNumber(&'static str, String),
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
    /// Remote store REST endpoint. `None` selects the in-memory fallback.
    pub kv_rest_url: Option<String>,
    /// Bearer token for the remote store endpoint.
    pub kv_rest_token: Option<String>,
    /// Static admin token compared against `x-admin-token`.
    /// `None` means admin routes refuse every request.
    pub admin_token: Option<String>,
    /// Chain ID assumed when requests omit one.
    pub default_chain_id: u64,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", "0.0.0.0");
        let port: u16 = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("PORT", raw))?,
            Err(_) => 8080,
        };

        let kv_rest_url = env::var(KV_REST_URL_ENV).ok().filter(|s| !s.is_empty());
        let kv_rest_token = env::var(KV_REST_TOKEN_ENV).ok().filter(|s| !s.is_empty());

        if let Some(ref url) = kv_rest_url {
            Url::parse(url)
                .map_err(|e| ConfigError::InvalidUrl(KV_REST_URL_ENV, e.to_string()))?;
            if kv_rest_token.is_none() {
                return Err(ConfigError::MissingCompanion(
                    KV_REST_URL_ENV,
                    KV_REST_TOKEN_ENV,
                ));
            }
        }

        let admin_token = env::var(ADMIN_API_TOKEN_ENV).ok().filter(|s| !s.is_empty());

        let default_chain_id = match env::var("DEFAULT_CHAIN_ID") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("DEFAULT_CHAIN_ID", raw))?,
            Err(_) => DEFAULT_CHAIN_ID,
        };

        Ok(Self {
            host,
            port,
            kv_rest_url,
            kv_rest_token,
            admin_token,
            default_chain_id,
        })
    }

    /// Chain ID to use for an optional request parameter.
    pub fn chain_or_default(&self, chain_id: Option<u64>) -> u64 {
        chain_id.unwrap_or(self.default_chain_id)
    }

    /// Configuration used by handler tests: in-memory store, fixed admin token.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            kv_rest_url: None,
            kv_rest_token: None,
            admin_token: Some("test-admin-token".to_string()),
            default_chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_or_default_prefers_explicit_value() {
        let config = Config::for_tests();
        assert_eq!(config.chain_or_default(Some(1)), 1);
        assert_eq!(config.chain_or_default(None), DEFAULT_CHAIN_ID);
    }
}
