// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Wallet address validation and normalization.
//!
//! The allow-list and KYC stores key on lowercase addresses so that lookups
//! are case-insensitive regardless of how the caller checksums them.

/// Check that `raw` looks like an EVM address: `0x` followed by 40 hex digits.
pub fn is_valid_address(raw: &str) -> bool {
    let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) else {
        return false;
    };
    hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize an address for storage and lookup.
pub fn normalize_address(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
