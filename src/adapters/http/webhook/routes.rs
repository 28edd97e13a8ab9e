//! Route definitions for webhook endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{handle_booking_webhook, WebhookAppState};

/// Builds the webhook route tree.
///
/// Separate from the registration routes because deliveries are
/// authenticated by shared token instead of subject identity.
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/webhooks/booking", post(handle_booking_webhook))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use secrecy::Secret;

    use crate::adapters::gateway::MockBookingGateway;
    use crate::adapters::memory::InMemoryRegistrationStore;
    use crate::application::reconciliation::ReconciliationEngine;

    #[test]
    fn webhook_routes_construct() {
        let store = Arc::new(InMemoryRegistrationStore::new());
        let gateway = Arc::new(MockBookingGateway::new());
        let state = WebhookAppState {
            engine: Arc::new(ReconciliationEngine::new(store, gateway)),
            webhook_token: Some(Secret::new("whsec_test".to_string())),
        };
        let _router: Router = webhook_routes().with_state(state);
    }
}
