//! HTTP DTOs for registration endpoints.
//!
//! These types define the JSON request/response structure of the public API
//! and form the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::handlers::registration::{BookGroupResult, BookSoloResult, BookedMember};
use crate::domain::registration::{Gender, GroupMember, PaymentStatus, Registration};

// ── Request DTOs ───────────────────────────────────────────────────────

/// Request to book a solo ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSoloRequest {
    pub ticket_id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub gender: Gender,
}

/// Request to book a group ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct BookGroupRequest {
    pub ticket_id: u32,
    pub college: String,
    /// Members in submission order.
    pub members: Vec<GroupMember>,
}

// ── Response DTOs ──────────────────────────────────────────────────────

/// A booked solo registration.
#[derive(Debug, Clone, Serialize)]
pub struct BookSoloResponse {
    pub key: String,
    pub booking_id: String,
    pub status: PaymentStatus,
    pub payment_url: String,
}

impl From<BookSoloResult> for BookSoloResponse {
    fn from(result: BookSoloResult) -> Self {
        Self {
            key: result.key.as_str().to_string(),
            booking_id: result.booking_id.as_str().to_string(),
            status: result.status,
            payment_url: result.payment_url,
        }
    }
}

/// A booked group.
#[derive(Debug, Clone, Serialize)]
pub struct BookGroupResponse {
    pub group_id: String,
    pub parent_booking_id: String,
    pub payment_url: String,
    pub members: Vec<BookedMemberResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookedMemberResponse {
    pub key: String,
    pub booking_id: String,
    pub name: String,
    pub role: String,
    pub status: PaymentStatus,
}

impl From<BookedMember> for BookedMemberResponse {
    fn from(member: BookedMember) -> Self {
        Self {
            key: member.key.as_str().to_string(),
            booking_id: member.booking_id.as_str().to_string(),
            name: member.name,
            role: member.role.to_string(),
            status: member.status,
        }
    }
}

impl From<BookGroupResult> for BookGroupResponse {
    fn from(result: BookGroupResult) -> Self {
        Self {
            group_id: result.group_id.to_string(),
            parent_booking_id: result.parent_booking_id.as_str().to_string(),
            payment_url: result.payment_url,
            members: result
                .members
                .into_iter()
                .map(BookedMemberResponse::from)
                .collect(),
        }
    }
}

/// One registration as seen through the API.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub key: String,
    pub ticket_id: u32,
    pub status: PaymentStatus,
    pub booking_id: Option<String>,
    pub payment_url: String,
    pub group_id: Option<String>,
    pub name: String,
    pub created_at: String,
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        Self {
            key: registration.key.as_str().to_string(),
            ticket_id: registration.ticket_id.as_u32(),
            status: registration.status,
            booking_id: registration.booking_id.map(|b| b.as_str().to_string()),
            payment_url: registration.payment_url,
            group_id: registration.kind.group_id().map(|g| g.to_string()),
            name: registration.profile.name,
            created_at: registration.created_at.to_string(),
        }
    }
}

/// Listing of registrations.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationListResponse {
    pub registrations: Vec<RegistrationResponse>,
}

/// Members of a group, display-ordered.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMembersResponse {
    pub group_id: String,
    pub members: Vec<RegistrationResponse>,
}

/// Standard error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
