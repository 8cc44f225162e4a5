// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Lotside

//! Payment webhook intake.
//!
//! Acknowledges `payment.succeeded` events from the payments provider and
//! logs their listing metadata. Everything else is acknowledged and ignored
//! so the provider stops redelivering.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{api::extract::Json, error::ApiError, state::AppState};

/// Event type this handler acts on.
const PAYMENT_SUCCEEDED: &str = "payment.succeeded";

/// Incoming webhook event envelope.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentEvent {
    /// Event type, e.g. `payment.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Provider event id.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub data: PaymentEventData,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaymentEventData {
    #[serde(default)]
    pub metadata: PaymentMetadata,
}

/// Metadata the checkout flow attaches to a payment.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    #[serde(default)]
    pub listing_id: Option<String>,
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub token_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub ok: bool,
    /// Whether the event type was one this service acts on.
    pub processed: bool,
}

/// Receive a payment webhook event.
#[utoipa::path(
    post,
    path = "/api/webhooks/payments",
    tag = "Webhooks",
    request_body = PaymentEvent,
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Missing event type")
    )
)]
pub async fn receive_payment_event(
    State(_state): State<AppState>,
    Json(event): Json<PaymentEvent>,
) -> Result<Json<WebhookAck>, ApiError> {
    if event.event_type.trim().is_empty() {
        return Err(ApiError::bad_request("event type is required"));
    }

    if event.event_type != PAYMENT_SUCCEEDED {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
        return Ok(Json(WebhookAck {
            ok: true,
            processed: false,
        }));
    }

    let metadata = &event.data.metadata;
    tracing::info!(
        event_id = event.id.as_deref().unwrap_or("unknown"),
        listing_id = metadata.listing_id.as_deref().unwrap_or("unknown"),
        buyer = metadata.buyer.as_deref().unwrap_or("unknown"),
        token_id = metadata.token_id.as_deref().unwrap_or("unknown"),
        "Payment succeeded"
    );

    // TODO: record provider event ids so redelivered events are not
    // fulfilled twice, and trigger on-chain settlement of the purchased
    // token once the settlement path exists.

    Ok(Json(WebhookAck {
        ok: true,
        processed: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn event(event_type: &str) -> PaymentEvent {
        PaymentEvent {
            event_type: event_type.to_string(),
            id: Some("evt_123".to_string()),
            data: PaymentEventData {
                metadata: PaymentMetadata {
                    listing_id: Some("lst_0001".to_string()),
                    buyer: Some("0x52908400098527886e0f7030069857d2e4169ee7".to_string()),
                    chain_id: Some(137),
                    token_id: Some("42".to_string()),
                },
            },
        }
    }

    #[tokio::test]
    async fn payment_succeeded_is_processed() {
        let state = AppState::for_tests();
        let Json(ack) = receive_payment_event(State(state), Json(event("payment.succeeded")))
            .await
            .unwrap();
        assert!(ack.ok);
        assert!(ack.processed);
    }

    #[tokio::test]
    async fn other_event_types_are_acknowledged_but_ignored() {
        let state = AppState::for_tests();
        let Json(ack) = receive_payment_event(State(state), Json(event("payment.failed")))
            .await
            .unwrap();
        assert!(ack.ok);
        assert!(!ack.processed);
    }

    #[tokio::test]
    async fn empty_event_type_is_a_400() {
        let state = AppState::for_tests();
        let err = receive_payment_event(State(state), Json(event("")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn event_deserializes_with_minimal_body() {
        let event: PaymentEvent = serde_json::from_str(r#"{"type":"payment.succeeded"}"#).unwrap();
        assert_eq!(event.event_type, "payment.succeeded");
        assert!(event.data.metadata.listing_id.is_none());
    }
}
