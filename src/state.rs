// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

use std::sync::Arc;

use crate::config::Config;
use crate::kv::KvStore;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KvStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(kv: Arc<dyn KvStore>, config: Arc<Config>) -> Self {
        Self { kv, config }
    }

    /// State backed by an in-memory store with a fixed test admin token.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(
            Arc::new(crate::kv::MemoryKv::new()),
            Arc::new(Config::for_tests()),
        )
    }

    /// Test state with no admin token configured.
    #[cfg(test)]
    pub fn for_tests_without_admin_token() -> Self {
        let mut config = Config::for_tests();
        config.admin_token = None;
        Self::new(Arc::new(crate::kv::MemoryKv::new()), Arc::new(config))
    }
}
