// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Allow-list routes.
//!
//! Mutating routes (`add`, `remove`, `clear`, `members`, `requests`) sit
//! behind the admin token. `check` and `count` are public reads, and
//! `request` is the public, rate-limited join-request intake.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    address::is_valid_address,
    allowlist::{AllowlistStore, JoinRequest, MemberPage},
    api::extract::{Json, Query},
    auth::AdminToken,
    error::ApiError,
    ratelimit::RateLimiter,
    state::AppState,
};

/// Join requests allowed per address per listing within one window.
const JOIN_REQUEST_LIMIT: i64 = 5;
/// Join-request window length in seconds.
const JOIN_REQUEST_WINDOW_SECS: u64 = 60;

/// Hard cap on the members page size.
const MAX_PAGE_SIZE: u64 = 1000;
/// Page size when the query omits `count`.
const DEFAULT_PAGE_SIZE: u64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body for add/remove operations.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberBody {
    pub listing_id: String,
    pub address: String,
    pub chain_id: Option<u64>,
}

/// Body for operations that target a whole listing.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingBody {
    pub listing_id: String,
    pub chain_id: Option<u64>,
}

/// Body for public join requests.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestBody {
    pub listing_id: String,
    pub address: String,
    pub email: String,
    pub chain_id: Option<u64>,
}

/// Query for membership checks.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MemberQuery {
    pub listing_id: String,
    pub address: String,
    pub chain_id: Option<u64>,
}

/// Query for listing-wide reads.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub listing_id: String,
    pub chain_id: Option<u64>,
}

/// Query for paginated member enumeration.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MembersQuery {
    pub listing_id: String,
    pub chain_id: Option<u64>,
    pub cursor: Option<u64>,
    pub count: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddResponse {
    pub ok: bool,
    pub added: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveResponse {
    pub ok: bool,
    pub removed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckResponse {
    pub allowed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestsResponse {
    pub requests: Vec<JoinRequest>,
}

// ============================================================================
// Validation helpers
// ============================================================================

fn require_listing(listing_id: &str) -> Result<(), ApiError> {
    if listing_id.trim().is_empty() {
        return Err(ApiError::bad_request("listingId is required"));
    }
    Ok(())
}

fn require_address(address: &str) -> Result<(), ApiError> {
    if !is_valid_address(address.trim()) {
        return Err(ApiError::bad_request(
            "address must be a 0x-prefixed 40-hex-digit address",
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Add an address to a listing's allow-list.
#[utoipa::path(
    post,
    path = "/api/allowlist/add",
    tag = "Allowlist",
    request_body = MemberBody,
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Address added (or already present)", body = AddResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn add_member(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(body): Json<MemberBody>,
) -> Result<Json<AddResponse>, ApiError> {
    require_listing(&body.listing_id)?;
    require_address(&body.address)?;

    let chain_id = state.config.chain_or_default(body.chain_id);
    let store = AllowlistStore::new(state.kv.as_ref());
    let added = store.add(&body.listing_id, chain_id, &body.address).await?;

    Ok(Json(AddResponse { ok: true, added }))
}

/// Remove an address from a listing's allow-list.
#[utoipa::path(
    post,
    path = "/api/allowlist/remove",
    tag = "Allowlist",
    request_body = MemberBody,
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Address removed (or was not present)", body = RemoveResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn remove_member(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(body): Json<MemberBody>,
) -> Result<Json<RemoveResponse>, ApiError> {
    require_listing(&body.listing_id)?;
    require_address(&body.address)?;

    let chain_id = state.config.chain_or_default(body.chain_id);
    let store = AllowlistStore::new(state.kv.as_ref());
    let removed = store
        .remove(&body.listing_id, chain_id, &body.address)
        .await?;

    Ok(Json(RemoveResponse { ok: true, removed }))
}

/// Check whether an address is on a listing's allow-list.
#[utoipa::path(
    get,
    path = "/api/allowlist/check",
    tag = "Allowlist",
    params(MemberQuery),
    responses(
        (status = 200, description = "Membership result", body = CheckResponse),
        (status = 400, description = "Missing or malformed fields")
    )
)]
pub async fn check_member(
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<CheckResponse>, ApiError> {
    require_listing(&query.listing_id)?;
    require_address(&query.address)?;

    let chain_id = state.config.chain_or_default(query.chain_id);
    let store = AllowlistStore::new(state.kv.as_ref());
    let allowed = store.has(&query.listing_id, chain_id, &query.address).await?;

    Ok(Json(CheckResponse { allowed }))
}

/// Number of approved addresses on a listing's allow-list.
#[utoipa::path(
    get,
    path = "/api/allowlist/count",
    tag = "Allowlist",
    params(ListingQuery),
    responses(
        (status = 200, description = "Member count", body = CountResponse),
        (status = 400, description = "Missing listing id")
    )
)]
pub async fn member_count(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    require_listing(&query.listing_id)?;

    let chain_id = state.config.chain_or_default(query.chain_id);
    let store = AllowlistStore::new(state.kv.as_ref());
    let count = store.count(&query.listing_id, chain_id).await?;

    Ok(Json(CountResponse { count }))
}

/// Enumerate a listing's allow-list, one page at a time.
#[utoipa::path(
    get,
    path = "/api/allowlist/members",
    tag = "Allowlist",
    params(MembersQuery),
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "One page of members", body = MemberPage),
        (status = 400, description = "Missing listing id"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn list_members(
    _admin: AdminToken,
    State(state): State<AppState>,
    Query(query): Query<MembersQuery>,
) -> Result<Json<MemberPage>, ApiError> {
    require_listing(&query.listing_id)?;

    let chain_id = state.config.chain_or_default(query.chain_id);
    let cursor = query.cursor.unwrap_or(0);
    // The remote store rejects SSCAN COUNT 0, so the page size floors at 1.
    let count = query.count.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let store = AllowlistStore::new(state.kv.as_ref());
    let page = store
        .members(&query.listing_id, chain_id, cursor, count)
        .await?;

    Ok(Json(page))
}

/// Drop every address from a listing's allow-list.
#[utoipa::path(
    post,
    path = "/api/allowlist/clear",
    tag = "Allowlist",
    request_body = ListingBody,
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Allow-list cleared", body = OkResponse),
        (status = 400, description = "Missing listing id"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn clear_members(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(body): Json<ListingBody>,
) -> Result<Json<OkResponse>, ApiError> {
    require_listing(&body.listing_id)?;

    let chain_id = state.config.chain_or_default(body.chain_id);
    let store = AllowlistStore::new(state.kv.as_ref());
    store.clear(&body.listing_id, chain_id).await?;

    tracing::info!(
        listing_id = %body.listing_id,
        chain_id,
        "Allow-list cleared"
    );
    Ok(Json(OkResponse { ok: true }))
}

/// Submit a public request to join a listing's allow-list.
///
/// Rate-limited per address and listing; rejected requests get a 429 with a
/// retry hint in the message.
#[utoipa::path(
    post,
    path = "/api/allowlist/request",
    tag = "Allowlist",
    request_body = JoinRequestBody,
    responses(
        (status = 200, description = "Request queued", body = OkResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 429, description = "Too many requests for this address")
    )
)]
pub async fn request_access(
    State(state): State<AppState>,
    Json(body): Json<JoinRequestBody>,
) -> Result<Json<OkResponse>, ApiError> {
    require_listing(&body.listing_id)?;
    require_address(&body.address)?;
    if body.email.trim().is_empty() || !body.email.contains('@') {
        return Err(ApiError::bad_request("email is required"));
    }

    let chain_id = state.config.chain_or_default(body.chain_id);
    let request = JoinRequest::new(&body.address, body.email.trim());

    let bucket = format!("wl-join:{chain_id}:{}:{}", body.listing_id, request.address);
    let limiter = RateLimiter::new(state.kv.as_ref());
    let decision = limiter
        .check(&bucket, JOIN_REQUEST_LIMIT, JOIN_REQUEST_WINDOW_SECS)
        .await?;
    if !decision.allowed {
        let retry = decision.retry_after_secs.unwrap_or(JOIN_REQUEST_WINDOW_SECS as i64);
        return Err(ApiError::too_many_requests(format!(
            "Too many join requests for this address; retry in {retry}s"
        )));
    }

    let store = AllowlistStore::new(state.kv.as_ref());
    store
        .push_request(&body.listing_id, chain_id, &request)
        .await?;

    tracing::info!(
        listing_id = %body.listing_id,
        chain_id,
        address = %request.address,
        "Join request queued"
    );
    Ok(Json(OkResponse { ok: true }))
}

/// Pending join requests for a listing, oldest first.
#[utoipa::path(
    get,
    path = "/api/allowlist/requests",
    tag = "Allowlist",
    params(ListingQuery),
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Pending join requests", body = RequestsResponse),
        (status = 400, description = "Missing listing id"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
pub async fn list_requests(
    _admin: AdminToken,
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<RequestsResponse>, ApiError> {
    require_listing(&query.listing_id)?;

    let chain_id = state.config.chain_or_default(query.chain_id);
    let store = AllowlistStore::new(state.kv.as_ref());
    let requests = store.requests(&query.listing_id, chain_id).await?;

    Ok(Json(RequestsResponse { requests }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const LISTING: &str = "lst_0001";
    const ADDR: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn member_body(address: &str) -> MemberBody {
        MemberBody {
            listing_id: LISTING.to_string(),
            address: address.to_string(),
            chain_id: None,
        }
    }

    #[tokio::test]
    async fn add_then_check_then_remove() {
        let state = AppState::for_tests();

        let Json(added) = add_member(AdminToken, State(state.clone()), Json(member_body(ADDR)))
            .await
            .expect("add succeeds");
        assert!(added.ok && added.added);

        let Json(check) = check_member(
            State(state.clone()),
            Query(MemberQuery {
                listing_id: LISTING.to_string(),
                address: ADDR.to_ascii_lowercase(),
                chain_id: None,
            }),
        )
        .await
        .expect("check succeeds");
        assert!(check.allowed);

        let Json(removed) = remove_member(AdminToken, State(state.clone()), Json(member_body(ADDR)))
            .await
            .expect("remove succeeds");
        assert!(removed.removed);

        let Json(check) = check_member(
            State(state),
            Query(MemberQuery {
                listing_id: LISTING.to_string(),
                address: ADDR.to_string(),
                chain_id: None,
            }),
        )
        .await
        .unwrap();
        assert!(!check.allowed);
    }

    #[tokio::test]
    async fn re_adding_reports_added_false() {
        let state = AppState::for_tests();
        add_member(AdminToken, State(state.clone()), Json(member_body(ADDR)))
            .await
            .unwrap();
        let Json(second) = add_member(AdminToken, State(state), Json(member_body(ADDR)))
            .await
            .unwrap();
        assert!(second.ok);
        assert!(!second.added);
    }

    #[tokio::test]
    async fn malformed_address_is_a_400() {
        let state = AppState::for_tests();
        let err = add_member(AdminToken, State(state), Json(member_body("0x1234")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_listing_id_is_a_400() {
        let state = AppState::for_tests();
        let err = member_count(
            State(state),
            Query(ListingQuery {
                listing_id: "  ".to_string(),
                chain_id: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn count_tracks_membership() {
        let state = AppState::for_tests();
        for i in 0..3 {
            let addr = format!("0x{:040x}", i + 1);
            add_member(AdminToken, State(state.clone()), Json(member_body(&addr)))
                .await
                .unwrap();
        }

        let Json(count) = member_count(
            State(state),
            Query(ListingQuery {
                listing_id: LISTING.to_string(),
                chain_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(count.count, 3);
    }

    #[tokio::test]
    async fn members_pagination_reaches_every_address() {
        let state = AppState::for_tests();
        for i in 0..12 {
            let addr = format!("0x{:040x}", i + 1);
            add_member(AdminToken, State(state.clone()), Json(member_body(&addr)))
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = 0;
        loop {
            let Json(page) = list_members(
                AdminToken,
                State(state.clone()),
                Query(MembersQuery {
                    listing_id: LISTING.to_string(),
                    chain_id: None,
                    cursor: Some(cursor),
                    count: Some(5),
                }),
            )
            .await
            .unwrap();
            seen.extend(page.addresses);
            if page.cursor == 0 {
                break;
            }
            cursor = page.cursor;
        }
        assert_eq!(seen.len(), 12);
    }

    #[tokio::test]
    async fn zero_page_size_is_floored_to_one() {
        let state = AppState::for_tests();
        for i in 0..2 {
            let addr = format!("0x{:040x}", i + 1);
            add_member(AdminToken, State(state.clone()), Json(member_body(&addr)))
                .await
                .unwrap();
        }

        let Json(page) = list_members(
            AdminToken,
            State(state),
            Query(MembersQuery {
                listing_id: LISTING.to_string(),
                chain_id: None,
                cursor: Some(0),
                count: Some(0),
            }),
        )
        .await
        .expect("count=0 must not reach the store");
        assert_eq!(page.addresses.len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_the_list() {
        let state = AppState::for_tests();
        add_member(AdminToken, State(state.clone()), Json(member_body(ADDR)))
            .await
            .unwrap();

        clear_members(
            AdminToken,
            State(state.clone()),
            Json(ListingBody {
                listing_id: LISTING.to_string(),
                chain_id: None,
            }),
        )
        .await
        .unwrap();

        let Json(count) = member_count(
            State(state),
            Query(ListingQuery {
                listing_id: LISTING.to_string(),
                chain_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(count.count, 0);
    }

    #[tokio::test]
    async fn chain_id_defaults_to_polygon() {
        let state = AppState::for_tests();
        add_member(AdminToken, State(state.clone()), Json(member_body(ADDR)))
            .await
            .unwrap();

        // Explicitly asking on chain 137 sees the member; chain 1 does not.
        let Json(on_default) = check_member(
            State(state.clone()),
            Query(MemberQuery {
                listing_id: LISTING.to_string(),
                address: ADDR.to_string(),
                chain_id: Some(137),
            }),
        )
        .await
        .unwrap();
        assert!(on_default.allowed);

        let Json(on_mainnet) = check_member(
            State(state),
            Query(MemberQuery {
                listing_id: LISTING.to_string(),
                address: ADDR.to_string(),
                chain_id: Some(1),
            }),
        )
        .await
        .unwrap();
        assert!(!on_mainnet.allowed);
    }

    fn join_body(email: &str) -> JoinRequestBody {
        JoinRequestBody {
            listing_id: LISTING.to_string(),
            address: ADDR.to_string(),
            email: email.to_string(),
            chain_id: None,
        }
    }

    #[tokio::test]
    async fn join_request_roundtrip() {
        let state = AppState::for_tests();

        request_access(State(state.clone()), Json(join_body("buyer@example.com")))
            .await
            .expect("request queued");

        let Json(listed) = list_requests(
            AdminToken,
            State(state),
            Query(ListingQuery {
                listing_id: LISTING.to_string(),
                chain_id: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(listed.requests.len(), 1);
        assert_eq!(listed.requests[0].email, "buyer@example.com");
        assert_eq!(listed.requests[0].address, ADDR.to_ascii_lowercase());
    }

    #[tokio::test]
    async fn join_request_requires_email() {
        let state = AppState::for_tests();
        let err = request_access(State(state), Json(join_body("not-an-email")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn join_requests_are_rate_limited() {
        let state = AppState::for_tests();

        for _ in 0..JOIN_REQUEST_LIMIT {
            request_access(State(state.clone()), Json(join_body("buyer@example.com")))
                .await
                .expect("within the window budget");
        }

        let err = request_access(State(state.clone()), Json(join_body("buyer@example.com")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);

        // A different address is not affected.
        let other = JoinRequestBody {
            address: format!("0x{:040x}", 99),
            ..join_body("other@example.com")
        };
        request_access(State(state), Json(other))
            .await
            .expect("other address has its own bucket");
    }
}
