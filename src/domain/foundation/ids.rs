//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Verified identity of a registering subject (assigned by the auth provider).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a SubjectId, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("subject_id"));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a booking on the external payment/ticketing provider.
///
/// Opaque and provider-assigned; immutable once attached to a registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("booking_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier shared by all member registrations created from one bulk booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Creates a new random GroupId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a GroupId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Provider-side ticket identifier (one per event, accommodation or merch item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u32);

impl TicketId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic primary key of a registration record.
///
/// Solo registrations are keyed by subject + ticket so the store's conditional
/// create can serialize duplicate booking attempts. Group-member registrations
/// are keyed by their provider-assigned child booking id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationKey(String);

impl RegistrationKey {
    /// Key for a solo registration: `<subject id>:<ticket id>`.
    pub fn solo(subject: &SubjectId, ticket: TicketId) -> Self {
        Self(format!("{}:{}", subject.as_str(), ticket))
    }

    /// Key for a group-member registration: the child booking id.
    pub fn group_member(booking: &BookingId) -> Self {
        Self(booking.as_str().to_string())
    }

    /// Reconstructs a key from its stored form.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_rejects_empty() {
        assert!(SubjectId::new("").is_err());
        assert!(SubjectId::new("   ").is_err());
        assert!(SubjectId::new("uid-123").is_ok());
    }

    #[test]
    fn booking_id_rejects_empty() {
        assert!(BookingId::new("").is_err());
        assert!(BookingId::new("bkg_1").is_ok());
    }

    #[test]
    fn group_id_round_trips_through_string() {
        let id = GroupId::new();
        let parsed: GroupId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn solo_key_is_deterministic() {
        let subject = SubjectId::new("uid-1").unwrap();
        let a = RegistrationKey::solo(&subject, TicketId::new(2605));
        let b = RegistrationKey::solo(&subject, TicketId::new(2605));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "uid-1:2605");
    }

    #[test]
    fn group_member_key_is_the_booking_id() {
        let booking = BookingId::new("bkg_child_7").unwrap();
        let key = RegistrationKey::group_member(&booking);
        assert_eq!(key.as_str(), "bkg_child_7");
    }

    #[test]
    fn distinct_tickets_produce_distinct_keys() {
        let subject = SubjectId::new("uid-1").unwrap();
        let a = RegistrationKey::solo(&subject, TicketId::new(1));
        let b = RegistrationKey::solo(&subject, TicketId::new(2));
        assert_ne!(a, b);
    }
}
