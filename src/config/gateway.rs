//! Booking provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the external booking and payment provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the provider's booking API
    pub base_url: String,

    /// Bearer token for outbound API calls
    pub api_token: Secret<String>,

    /// Shared secret the provider sends in the `x-webhook-token` header.
    /// Optional: when unset, all webhook deliveries are rejected.
    pub webhook_token: Option<Secret<String>>,

    /// Base URL of the provider's hosted payment page. A payment URL is
    /// rebuilt as `<payment_page_base_url><payment_id>` when the stored
    /// one is missing.
    pub payment_page_base_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if self.api_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_API_TOKEN"));
        }
        if !self.payment_page_base_url.starts_with("http://")
            && !self.payment_page_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidPaymentPageUrl);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_request_timeout() -> u64 {
    15
}
