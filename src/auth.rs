// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Admin gate for mutating routes.
//!
//! Use the `AdminToken` extractor in handlers that mutate allow-list or KYC
//! state:
//!
//! ```rust,ignore
//! async fn my_handler(_admin: AdminToken) -> impl IntoResponse {
//!     // only reached with a valid x-admin-token header
//! }
//! ```
//!
//! The token is a single static value from `ADMIN_API_TOKEN`; there is no
//! signing, no expiry and no per-route scoping.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, state::AppState};

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin authorization error.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminAuthError {
    /// No `x-admin-token` header present.
    MissingToken,
    /// Header present but does not match the configured token.
    InvalidToken,
    /// `ADMIN_API_TOKEN` is not set on the server.
    NotConfigured,
}

impl AdminAuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminAuthError::MissingToken | AdminAuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AdminAuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AdminAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminAuthError::MissingToken => write!(f, "x-admin-token header is required"),
            AdminAuthError::InvalidToken => write!(f, "Invalid admin token"),
            AdminAuthError::NotConfigured => write!(f, "Admin token is not configured"),
        }
    }
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        ApiError::new(self.status_code(), self.to_string()).into_response()
    }
}

/// Extractor that requires a valid admin token.
///
/// Rejection happens before the handler body runs, so an unauthorized
/// request can never touch the store.
pub struct AdminToken;

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(ref expected) = state.config.admin_token else {
            return Err(AdminAuthError::NotConfigured);
        };

        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .ok_or(AdminAuthError::MissingToken)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidToken)?;

        if provided != expected {
            return Err(AdminAuthError::InvalidToken);
        }

        Ok(AdminToken)
    }
}
