//! HTTP adapter for the booking provider's REST API.
//!
//! Owns the provider wire format and authentication. Wire types live here
//! and never leak past the port boundary.

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::GatewayConfig;
use crate::domain::registration::PaymentStatus;
use crate::ports::{
    BookingCreated, BookingGateway, BookingSnapshot, BulkBookingCreated, ChildBooking,
    CreateBookingRequest, CreateBulkBookingRequest, GatewayError,
};
use async_trait::async_trait;

/// Booking gateway backed by the provider's HTTP API.
pub struct HttpBookingGateway {
    client: reqwest::Client,
    base_url: String,
    api_token: Secret<String>,
}

impl HttpBookingGateway {
    /// Build a gateway from configuration.
    ///
    /// The request timeout is set on the client, so every operation shares
    /// the same deadline.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.api_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        decode_response(response).await
    }

    async fn get_json<R: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<R, GatewayError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await
            .map_err(map_transport_error)?;

        decode_response(response).await
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Network(err.to_string())
    }
}

async fn decode_response<R: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<R, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Http {
            status: status.as_u16(),
            body: truncate(&body, 512),
        });
    }

    // Two-step decode so a parse failure reports the offending body.
    let body = response.text().await.map_err(map_transport_error)?;
    serde_json::from_str(&body)
        .map_err(|e| GatewayError::Malformed(format!("{} in body {}", e, truncate(&body, 256))))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

fn parse_status(raw: &str) -> Result<PaymentStatus, GatewayError> {
    raw.parse()
        .map_err(|_| GatewayError::Malformed(format!("unknown booking status '{}'", raw)))
}

// ── Wire types ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireCreateBooking<'a> {
    ticket_id: u32,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    metadata: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct WireCreateBulkBooking<'a> {
    ticket_id: u32,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    members: Vec<WireBulkMember<'a>>,
    metadata: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct WireBulkMember<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    metadata: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireBookingResponse {
    booking: WireBooking,
    payment: WirePaymentRedirect,
}

#[derive(Debug, Deserialize)]
struct WireBooking {
    uid: String,
    status: String,
    #[serde(default)]
    child_bookings: Vec<WireChildBooking>,
}

#[derive(Debug, Deserialize)]
struct WireChildBooking {
    uid: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct WirePaymentRedirect {
    url_to_redirect: String,
}

#[derive(Debug, Deserialize)]
struct WireBookingSnapshot {
    uid: String,
    status: String,
    #[serde(default)]
    payment: Option<WirePaymentInfo>,
}

#[derive(Debug, Deserialize)]
struct WirePaymentInfo {
    payment_id: Option<String>,
}

#[async_trait]
impl BookingGateway for HttpBookingGateway {
    #[instrument(skip_all, fields(ticket_id = request.ticket_id))]
    async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<BookingCreated, GatewayError> {
        let wire = WireCreateBooking {
            ticket_id: request.ticket_id,
            name: &request.name,
            email: &request.email,
            phone: &request.phone,
            metadata: &request.metadata,
        };

        let response: WireBookingResponse = self.post_json("/bookings", &wire).await?;
        debug!(booking_id = %response.booking.uid, "booking created");

        Ok(BookingCreated {
            booking_id: response.booking.uid,
            status: parse_status(&response.booking.status)?,
            payment_url: response.payment.url_to_redirect,
        })
    }

    #[instrument(skip_all, fields(ticket_id = request.ticket_id, members = request.members.len()))]
    async fn create_bulk_booking(
        &self,
        request: CreateBulkBookingRequest,
    ) -> Result<BulkBookingCreated, GatewayError> {
        let wire = WireCreateBulkBooking {
            ticket_id: request.ticket_id,
            name: &request.payer_name,
            email: &request.payer_email,
            phone: &request.payer_phone,
            members: request
                .members
                .iter()
                .map(|m| WireBulkMember {
                    name: &m.name,
                    email: &m.email,
                    phone: &m.phone,
                    metadata: &m.metadata,
                })
                .collect(),
            metadata: &request.metadata,
        };

        let response: WireBookingResponse = self.post_json("/bookings/bulk", &wire).await?;

        if response.booking.child_bookings.len() != request.members.len() {
            return Err(GatewayError::ChildCountMismatch {
                requested: request.members.len(),
                returned: response.booking.child_bookings.len(),
            });
        }

        let children = response
            .booking
            .child_bookings
            .into_iter()
            .map(|child| {
                Ok(ChildBooking {
                    booking_id: child.uid,
                    status: parse_status(&child.status)?,
                })
            })
            .collect::<Result<Vec<_>, GatewayError>>()?;

        debug!(parent = %response.booking.uid, children = children.len(), "bulk booking created");

        Ok(BulkBookingCreated {
            parent_booking_id: response.booking.uid,
            children,
            payment_url: response.payment.url_to_redirect,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_booking(&self, booking_id: &str) -> Result<BookingSnapshot, GatewayError> {
        let path = format!("/bookings/{}", booking_id);
        let response: WireBookingSnapshot = self.get_json(&path).await?;

        Ok(BookingSnapshot {
            booking_id: response.uid,
            status: parse_status(&response.status)?,
            payment_id: response.payment.and_then(|p| p.payment_id),
        })
    }
}
