//! The Registration record: one subject's participation in one ticket,
//! linked to a booking on the external provider.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BookingId, GroupId, RegistrationKey, SubjectId, TicketId, Timestamp, ValidationError,
};

use super::group::{Gender, MemberRole};
use super::status::PaymentStatus;

/// Profile fields captured at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub gender: Gender,
}

impl SubjectProfile {
    /// Validates contact fields before anything is sent to the provider.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing '@'"));
        }
        if self.phone.trim().len() < 10 {
            return Err(ValidationError::invalid_format(
                "phone",
                "must be at least 10 digits",
            ));
        }
        Ok(())
    }
}

/// Whether a registration stands alone or belongs to a group booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrationKind {
    Solo,
    GroupMember { group_id: GroupId, role: MemberRole },
}

impl RegistrationKind {
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            RegistrationKind::Solo => None,
            RegistrationKind::GroupMember { group_id, .. } => Some(*group_id),
        }
    }
}

/// A registration record.
///
/// Created on the first booking request and afterwards mutated only through
/// reconciliation (status) or booking attachment. `booking_id` is `None` only
/// for a reservation whose gateway call has not completed; such a record is
/// treated as abandoned by the next booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub key: RegistrationKey,
    pub subject_id: SubjectId,
    pub ticket_id: TicketId,
    pub kind: RegistrationKind,
    pub booking_id: Option<BookingId>,
    pub status: PaymentStatus,
    pub payment_url: String,
    pub profile: SubjectProfile,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Registration {
    /// Creates a solo reservation: the record written by the conditional
    /// create before the gateway is called. No booking id yet.
    pub fn reserve_solo(
        subject_id: SubjectId,
        ticket_id: TicketId,
        profile: SubjectProfile,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            key: RegistrationKey::solo(&subject_id, ticket_id),
            subject_id,
            ticket_id,
            kind: RegistrationKind::Solo,
            booking_id: None,
            status: PaymentStatus::PendingPayment,
            payment_url: String::new(),
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a group-member record from a provider child booking.
    ///
    /// Group children are keyed by the provider-assigned booking id, so the
    /// booking always exists before the record does.
    pub fn group_member(
        subject_id: SubjectId,
        ticket_id: TicketId,
        group_id: GroupId,
        role: MemberRole,
        booking_id: BookingId,
        initial_status: PaymentStatus,
        payment_url: String,
        profile: SubjectProfile,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            key: RegistrationKey::group_member(&booking_id),
            subject_id,
            ticket_id,
            kind: RegistrationKind::GroupMember { group_id, role },
            booking_id: Some(booking_id),
            status: initial_status,
            payment_url,
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    /// A reservation that never received a booking id is abandoned and may be
    /// purged and superseded by a fresh attempt.
    pub fn is_abandoned_reservation(&self) -> bool {
        self.booking_id.is_none() && !self.status.is_terminal()
    }
}
