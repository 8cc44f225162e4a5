// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    allowlist::{JoinRequest, MemberPage},
    kyc::KycStatus,
    state::AppState,
};

pub mod allowlist;
pub mod extract;
pub mod health;
pub mod kyc;
pub mod webhook;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/allowlist/add", post(allowlist::add_member))
        .route("/allowlist/remove", post(allowlist::remove_member))
        .route("/allowlist/check", get(allowlist::check_member))
        .route("/allowlist/count", get(allowlist::member_count))
        .route("/allowlist/members", get(allowlist::list_members))
        .route("/allowlist/clear", post(allowlist::clear_members))
        .route("/allowlist/request", post(allowlist::request_access))
        .route("/allowlist/requests", get(allowlist::list_requests))
        .route("/kyc/status", get(kyc::get_status).post(kyc::set_status))
        .route("/webhooks/payments", post(webhook::receive_payment_event))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        allowlist::add_member,
        allowlist::remove_member,
        allowlist::check_member,
        allowlist::member_count,
        allowlist::list_members,
        allowlist::clear_members,
        allowlist::request_access,
        allowlist::list_requests,
        kyc::get_status,
        kyc::set_status,
        webhook::receive_payment_event,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            JoinRequest,
            MemberPage,
            KycStatus,
            allowlist::MemberBody,
            allowlist::ListingBody,
            allowlist::JoinRequestBody,
            allowlist::AddResponse,
            allowlist::RemoveResponse,
            allowlist::CheckResponse,
            allowlist::CountResponse,
            allowlist::OkResponse,
            allowlist::RequestsResponse,
            kyc::SetKycBody,
            kyc::KycStatusResponse,
            kyc::SetKycResponse,
            webhook::PaymentEvent,
            webhook::WebhookAck,
            health::ReadyResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Allowlist", description = "Listing allow-list management"),
        (name = "KYC", description = "KYC status tracking"),
        (name = "Webhooks", description = "Payment provider callbacks"),
        (name = "Health", description = "Probes")
    )
)]
struct ApiDoc;
