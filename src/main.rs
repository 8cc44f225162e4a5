// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

use std::{env, net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use lotside_server::{
    api::router,
    config::Config,
    kv::{KvStore, MemoryKv, RestKv},
    state::AppState,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let kv: Arc<dyn KvStore> = match (&config.kv_rest_url, &config.kv_rest_token) {
        (Some(url), Some(token)) => {
            tracing::info!(endpoint = %url, "Using remote key-value store");
            match RestKv::new(url.clone(), token.clone()) {
                Ok(kv) => Arc::new(kv),
                Err(e) => {
                    eprintln!("Failed to build store client: {e}");
                    std::process::exit(1);
                }
            }
        }
        _ => {
            tracing::warn!(
                "KV_REST_URL not set; using the in-memory store. \
                 Allow-lists and KYC statuses will not survive a restart."
            );
            Arc::new(MemoryKv::new())
        }
    };

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN not set; admin routes will refuse every request");
    }

    let state = AppState::new(kv, Arc::new(config.clone()));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("Lotside gate server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");
}
