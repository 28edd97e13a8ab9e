//! HTTP adapter for provider webhook deliveries.

pub mod handlers;
pub mod routes;

pub use handlers::{WebhookAppState, WebhookPayload};
pub use routes::webhook_routes;
