// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! KYC status routes.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    address::{is_valid_address, normalize_address},
    api::extract::{Json, Query},
    auth::AdminToken,
    error::ApiError,
    kyc::{KycStatus, KycStore},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct KycQuery {
    pub address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetKycBody {
    pub address: String,
    pub status: KycStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KycStatusResponse {
    /// Normalized (lowercase) address.
    pub address: String,
    pub status: KycStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SetKycResponse {
    pub ok: bool,
    pub status: KycStatus,
}

fn require_address(address: &str) -> Result<(), ApiError> {
    if !is_valid_address(address.trim()) {
        return Err(ApiError::bad_request(
            "address must be a 0x-prefixed 40-hex-digit address",
        ));
    }
    Ok(())
}

/// Current KYC status for an address. Unknown addresses read as `none`.
#[utoipa::path(
    get,
    path = "/api/kyc/status",
    tag = "KYC",
    params(KycQuery),
    responses(
        (status = 200, description = "Current status", body = KycStatusResponse),
        (status = 400, description = "Malformed address")
    )
)]
pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<KycQuery>,
) -> Result<Json<KycStatusResponse>, ApiError> {
    require_address(&query.address)?;

    let store = KycStore::new(state.kv.as_ref());
    let status = store.get(&query.address).await?;

    Ok(Json(KycStatusResponse {
        address: normalize_address(&query.address),
        status,
    }))
}

/// Set the KYC status for an address.
///
/// Overwrites unconditionally; there is no transition validation and no
/// audit history.
#[utoipa::path(
    post,
    path = "/api/kyc/status",
    tag = "KYC",
    request_body = SetKycBody,
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Status stored", body = SetKycResponse),
        (status = 400, description = "Malformed address or status"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn set_status(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(body): Json<SetKycBody>,
) -> Result<Json<SetKycResponse>, ApiError> {
    require_address(&body.address)?;

    let store = KycStore::new(state.kv.as_ref());
    store.set(&body.address, body.status).await?;

    tracing::info!(
        address = %normalize_address(&body.address),
        status = %body.status,
        "KYC status updated"
    );
    Ok(Json(SetKycResponse {
        ok: true,
        status: body.status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const ADDR: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[tokio::test]
    async fn unknown_address_reads_as_none() {
        let state = AppState::for_tests();
        let Json(response) = get_status(
            State(state),
            Query(KycQuery {
                address: ADDR.to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status, KycStatus::None);
        assert_eq!(response.address, ADDR.to_ascii_lowercase());
    }

    #[tokio::test]
    async fn set_then_get_roundtrips_every_status() {
        let state = AppState::for_tests();

        for status in [KycStatus::None, KycStatus::Pending, KycStatus::Approved] {
            let Json(set) = set_status(
                AdminToken,
                State(state.clone()),
                Json(SetKycBody {
                    address: ADDR.to_string(),
                    status,
                }),
            )
            .await
            .expect("set succeeds");
            assert!(set.ok);
            assert_eq!(set.status, status);

            let Json(got) = get_status(
                State(state.clone()),
                Query(KycQuery {
                    // Query with a different casing than was stored.
                    address: ADDR.to_ascii_lowercase(),
                }),
            )
            .await
            .unwrap();
            assert_eq!(got.status, status);
        }
    }

    #[tokio::test]
    async fn malformed_address_is_a_400() {
        let state = AppState::for_tests();
        let err = get_status(
            State(state),
            Query(KycQuery {
                address: "nope".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
