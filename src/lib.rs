// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Lotside Gate Server - Marketplace Access Control Service
//!
//! This crate provides the gating workflow for Lotside listings: per-listing
//! allow-lists, KYC status tracking and rate limiting, all backed by a
//! remote key-value store reached over REST.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Admin-token gate for mutating routes
//! - `kv` - Remote key-value store client (plus in-memory fallback)
//! - `allowlist` / `kyc` / `ratelimit` - Gating stores

pub mod address;
pub mod allowlist;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod kv;
pub mod kyc;
pub mod ratelimit;
pub mod state;
