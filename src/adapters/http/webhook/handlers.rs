//! HTTP handler for provider webhook deliveries.
//!
//! The webhook payload is only used to locate the affected registration; the
//! authoritative status is always re-fetched from the provider by the
//! reconciliation engine. Token verification happens here, at the boundary,
//! before anything is parsed out of the body.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use crate::application::handlers::registration::{ProcessWebhookCommand, ProcessWebhookHandler};
use crate::application::reconciliation::{PushOutcome, ReconciliationEngine};
use crate::domain::foundation::BookingId;
use crate::domain::registration::RegistrationError;

use super::super::registration::dto::ErrorResponse;

const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

/// Shared state for the webhook endpoint.
#[derive(Clone)]
pub struct WebhookAppState {
    pub engine: Arc<ReconciliationEngine>,
    /// Shared secret the provider sends with every delivery. When unset,
    /// every delivery is rejected so that a misconfigured deployment fails
    /// loudly instead of accepting unauthenticated input.
    pub webhook_token: Option<Secret<String>>,
}

impl WebhookAppState {
    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(self.engine.clone())
    }
}

/// Provider webhook payload. Only the booking uid drives processing; the
/// event name and claimed status are captured solely for the receipt log
/// line, and everything else the provider sends is ignored.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub booking: WebhookBooking,
    #[serde(default)]
    pub event: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookBooking {
    pub uid: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Outcome of comparing the delivery token against the configured secret.
pub(crate) enum TokenCheck {
    Accepted,
    Unconfigured,
    Rejected,
}

pub(crate) fn verify_token(
    configured: Option<&Secret<String>>,
    provided: Option<&str>,
) -> TokenCheck {
    let Some(expected) = configured else {
        return TokenCheck::Unconfigured;
    };
    let Some(provided) = provided else {
        return TokenCheck::Rejected;
    };
    if expected
        .expose_secret()
        .as_bytes()
        .ct_eq(provided.as_bytes())
        .into()
    {
        TokenCheck::Accepted
    } else {
        TokenCheck::Rejected
    }
}

/// POST /api/webhooks/booking - Handle a booking status delivery
pub async fn handle_booking_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let provided = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    match verify_token(state.webhook_token.as_ref(), provided) {
        TokenCheck::Accepted => {}
        TokenCheck::Unconfigured => {
            error!("webhook delivery rejected: no webhook token configured");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "WEBHOOK_NOT_CONFIGURED",
                "Webhook processing is not configured",
            );
        }
        TokenCheck::Rejected => {
            warn!("webhook delivery rejected: token mismatch");
            return error_response(
                StatusCode::UNAUTHORIZED,
                "INVALID_WEBHOOK_TOKEN",
                "Webhook token is missing or invalid",
            );
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "webhook delivery rejected: unreadable payload");
            return error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_WEBHOOK_PAYLOAD",
                "Webhook payload could not be parsed",
            );
        }
    };

    // Receipt log: allow-listed fields only, never the raw body.
    info!(
        booking_uid = %payload.booking.uid,
        event = payload.event.as_deref().unwrap_or("-"),
        claimed_status = payload.booking.status.as_deref().unwrap_or("-"),
        "webhook delivery received"
    );

    let booking_id = match BookingId::new(payload.booking.uid) {
        Ok(id) => id,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_WEBHOOK_PAYLOAD",
                "Webhook payload carries an empty booking uid",
            );
        }
    };

    let handler = state.webhook_handler();
    match handler.handle(ProcessWebhookCommand { booking_id }).await {
        Ok(PushOutcome::Updated { key, status }) => {
            info!(key = %key, status = %status, "webhook applied");
            StatusCode::OK.into_response()
        }
        Ok(PushOutcome::Unchanged { key }) => {
            info!(key = %key, "webhook delivery was a no-op");
            StatusCode::OK.into_response()
        }
        Ok(PushOutcome::Unmatched) => {
            // Deliveries for bookings we never created (other tenants of the
            // provider, replays after cleanup) are acknowledged and dropped.
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => {
            let status = match &err {
                RegistrationError::Gateway { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!(error = %err, "webhook processing failed");
            error_response(status, "WEBHOOK_PROCESSING_FAILED", err.message())
        }
    }
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> axum::response::Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> Secret<String> {
        Secret::new(value.to_string())
    }

    #[test]
    fn missing_configuration_rejects_even_valid_tokens() {
        assert!(matches!(
            verify_token(None, Some("anything")),
            TokenCheck::Unconfigured
        ));
        assert!(matches!(verify_token(None, None), TokenCheck::Unconfigured));
    }

    #[test]
    fn matching_token_is_accepted() {
        let configured = secret("whsec_abc123");
        assert!(matches!(
            verify_token(Some(&configured), Some("whsec_abc123")),
            TokenCheck::Accepted
        ));
    }

    #[test]
    fn wrong_or_absent_token_is_rejected() {
        let configured = secret("whsec_abc123");
        assert!(matches!(
            verify_token(Some(&configured), Some("whsec_abc124")),
            TokenCheck::Rejected
        ));
        assert!(matches!(
            verify_token(Some(&configured), None),
            TokenCheck::Rejected
        ));
    }

    #[test]
    fn payload_only_needs_the_booking_uid() {
        let raw = r#"{"booking":{"uid":"bkg_9"}}"#;
        let payload: WebhookPayload = serde_json::from_slice(raw.as_bytes()).unwrap();
        assert_eq!(payload.booking.uid, "bkg_9");
        assert_eq!(payload.event, None);
        assert_eq!(payload.booking.status, None);
    }

    #[test]
    fn payload_captures_only_the_loggable_subset() {
        let raw = r#"{
            "booking": {"uid": "bkg_9", "status": "confirmed", "customer": {"email": "a@b.c"}},
            "event": "booking.updated",
            "signature_debug": "secret"
        }"#;
        let payload: WebhookPayload = serde_json::from_slice(raw.as_bytes()).unwrap();
        assert_eq!(payload.booking.uid, "bkg_9");
        assert_eq!(payload.event.as_deref(), Some("booking.updated"));
        assert_eq!(payload.booking.status.as_deref(), Some("confirmed"));
    }
}
