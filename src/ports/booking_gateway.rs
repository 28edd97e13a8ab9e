//! Booking gateway port for the external booking and payment provider.
//!
//! Defines the contract for creating bookings (solo and bulk) and fetching
//! their current payment state. Implementations own the wire format and
//! authentication; callers only see domain vocabulary.
//!
//! # Design
//!
//! - **Provider agnostic**: callers never see URLs, tokens or HTTP codes
//! - **Fetch is read-only**: `fetch_booking` never mutates provider state,
//!   so reconciliation may call it as often as it likes

use crate::domain::registration::{PaymentStatus, RegistrationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for the external booking provider.
///
/// Create operations are NOT idempotent on the provider side; the caller is
/// responsible for never issuing two creates for the same registration key.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Create a single booking.
    ///
    /// Returns the provider-assigned booking id, its initial status and the
    /// payment URL the subject must visit.
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingCreated, GatewayError>;

    /// Create a bulk booking with one child booking per member.
    ///
    /// Implementations must verify that the provider returned exactly one
    /// child booking per requested member and fail with
    /// [`GatewayError::ChildCountMismatch`] otherwise.
    async fn create_bulk_booking(
        &self,
        request: CreateBulkBookingRequest,
    ) -> Result<BulkBookingCreated, GatewayError>;

    /// Fetch the current state of an existing booking.
    async fn fetch_booking(&self, booking_id: &str) -> Result<BookingSnapshot, GatewayError>;
}

/// Request to create a single booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Ticket being booked, as the provider numbers it.
    pub ticket_id: u32,

    /// Subject contact fields forwarded to the provider.
    pub name: String,
    pub email: String,
    pub phone: String,

    /// Free-form metadata echoed back in webhooks and fetches.
    pub metadata: serde_json::Value,
}

/// Request to create a bulk booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBulkBookingRequest {
    pub ticket_id: u32,

    /// Contact fields of the member paying for the whole group.
    pub payer_name: String,
    pub payer_email: String,
    pub payer_phone: String,

    /// One entry per member, in request order. The provider returns child
    /// bookings in the same order.
    pub members: Vec<BulkMemberRequest>,

    pub metadata: serde_json::Value,
}

/// One member of a bulk booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub metadata: serde_json::Value,
}

/// Result of a successful single-booking create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreated {
    pub booking_id: String,
    pub status: PaymentStatus,
    pub payment_url: String,
}

/// Result of a successful bulk create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkBookingCreated {
    /// Parent booking id covering the whole group.
    pub parent_booking_id: String,

    /// Child bookings, one per requested member, in request order.
    pub children: Vec<ChildBooking>,

    /// Single payment URL for the group's combined amount.
    pub payment_url: String,
}

/// One child booking inside a bulk create response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildBooking {
    pub booking_id: String,
    pub status: PaymentStatus,
}

/// Current provider-side state of a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSnapshot {
    pub booking_id: String,
    pub status: PaymentStatus,

    /// Provider payment id, present once a payment attempt exists. The
    /// payment URL can be rebuilt from it when the stored one is missing.
    pub payment_id: Option<String>,
}

/// Errors from booking gateway operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The provider did not answer within the configured deadline.
    Timeout,

    /// Connection-level failure (DNS, TLS, refused).
    Network(String),

    /// The provider answered with a non-success HTTP status.
    Http { status: u16, body: String },

    /// The provider answered 2xx but the body did not parse.
    Malformed(String),

    /// A bulk create returned a different number of child bookings than
    /// members were requested.
    ChildCountMismatch { requested: usize, returned: usize },
}

impl GatewayError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Network(_) => true,
            GatewayError::Http { status, .. } => *status >= 500,
            GatewayError::Malformed(_) | GatewayError::ChildCountMismatch { .. } => false,
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Timeout => write!(f, "provider request timed out"),
            GatewayError::Network(msg) => write!(f, "network error: {}", msg),
            GatewayError::Http { status, body } => {
                write!(f, "provider returned HTTP {}: {}", status, body)
            }
            GatewayError::Malformed(msg) => write!(f, "malformed provider response: {}", msg),
            GatewayError::ChildCountMismatch {
                requested,
                returned,
            } => write!(
                f,
                "bulk booking returned {} child bookings for {} members",
                returned, requested
            ),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for RegistrationError {
    fn from(err: GatewayError) -> Self {
        let retryable = err.is_retryable();
        RegistrationError::gateway(err.to_string(), retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn BookingGateway) {}
    }

    #[test]
    fn server_side_http_errors_are_retryable() {
        let transient = GatewayError::Http {
            status: 503,
            body: String::new(),
        };
        let permanent = GatewayError::Http {
            status: 422,
            body: String::new(),
        };
        assert!(transient.is_retryable());
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn child_count_mismatch_is_never_retryable() {
        let err = GatewayError::ChildCountMismatch {
            requested: 5,
            returned: 3,
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("3 child bookings for 5 members"));
    }

    #[test]
    fn conversion_preserves_retryability() {
        let err: RegistrationError = GatewayError::Timeout.into();
        assert!(err.is_retryable());

        let err: RegistrationError = GatewayError::Malformed("truncated".into()).into();
        assert!(!err.is_retryable());
    }
}
