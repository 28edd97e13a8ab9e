//! Registration store port.
//!
//! Persistence contract for registration records. The two write primitives
//! carry the concurrency guarantees the booking flows depend on:
//!
//! - `create_if_absent` is an atomic conditional create; under concurrent
//!   calls for the same key exactly one caller observes `Created`.
//! - `batch_create` is all-or-nothing; a failed group write leaves no
//!   partial members behind.

use crate::domain::foundation::{BookingId, GroupId, RegistrationKey, SubjectId};
use crate::domain::registration::{PaymentStatus, Registration, RegistrationError};
use async_trait::async_trait;

/// Port for registration persistence.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Insert the record only if no record with its key exists.
    ///
    /// Returns [`CreateOutcome::AlreadyExists`] with the stored record when
    /// the key is taken. Never overwrites.
    async fn create_if_absent(
        &self,
        registration: Registration,
    ) -> Result<CreateOutcome, StoreError>;

    /// Insert all records atomically. If any key already exists or any
    /// insert fails, no record is written.
    async fn batch_create(&self, registrations: Vec<Registration>) -> Result<(), StoreError>;

    /// Apply a partial update to the record with the given key.
    ///
    /// Fields left `None` keep their stored value. Bumps `updated_at`.
    /// Returns the record as stored after the update.
    async fn update(
        &self,
        key: &RegistrationKey,
        update: &RegistrationUpdate,
    ) -> Result<Registration, StoreError>;

    /// Look up a record by its key.
    async fn find_by_key(
        &self,
        key: &RegistrationKey,
    ) -> Result<Option<Registration>, StoreError>;

    /// Look up the record holding the given external booking id.
    async fn find_by_booking_id(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Registration>, StoreError>;

    /// All records belonging to a subject, newest first.
    async fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<Registration>, StoreError>;

    /// All member records of a group, in creation order.
    async fn find_group_members(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Registration>, StoreError>;

    /// Delete the record with the given key. Deleting a missing key is not
    /// an error.
    async fn delete(&self, key: &RegistrationKey) -> Result<(), StoreError>;
}

/// Result of a conditional create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record was written; this caller owns the key.
    Created,

    /// A record with this key already existed; it is returned unchanged.
    AlreadyExists(Registration),
}

/// Partial update applied by [`RegistrationStore::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationUpdate {
    pub status: Option<PaymentStatus>,
    pub booking_id: Option<BookingId>,
    pub payment_url: Option<String>,
}

impl RegistrationUpdate {
    pub fn status(status: PaymentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_booking(mut self, booking_id: BookingId) -> Self {
        self.booking_id = Some(booking_id);
        self
    }

    pub fn with_payment_url(mut self, url: impl Into<String>) -> Self {
        self.payment_url = Some(url.into());
        self
    }
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database-level failure (connection, constraint, transaction).
    Database(String),

    /// A stored row could not be mapped back to a domain record.
    Corrupted(String),

    /// Update targeted a key with no record.
    MissingRecord(RegistrationKey),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
            StoreError::Corrupted(msg) => write!(f, "corrupted record: {}", msg),
            StoreError::MissingRecord(key) => write!(f, "no record for key {}", key),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingRecord(key) => RegistrationError::not_found(key),
            other => RegistrationError::store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn RegistrationStore) {}
    }

    #[test]
    fn update_builder_sets_only_requested_fields() {
        let update = RegistrationUpdate::status(PaymentStatus::Confirmed);
        assert_eq!(update.status, Some(PaymentStatus::Confirmed));
        assert!(update.booking_id.is_none());
        assert!(update.payment_url.is_none());

        let update = RegistrationUpdate::default()
            .with_booking(BookingId::new("bkg_1").unwrap())
            .with_payment_url("https://pay/bkg_1");
        assert!(update.status.is_none());
        assert!(update.booking_id.is_some());
        assert_eq!(update.payment_url.as_deref(), Some("https://pay/bkg_1"));
    }

    #[test]
    fn missing_record_maps_to_not_found() {
        let key = RegistrationKey::from_raw("uid-1:2605");
        let err: RegistrationError = StoreError::MissingRecord(key.clone()).into();
        assert_eq!(err, RegistrationError::not_found(key));
    }
}
