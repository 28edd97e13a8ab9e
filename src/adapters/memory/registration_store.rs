//! In-memory registration store.
//!
//! Backs unit and integration tests; also usable for local demos without a
//! database. Honors the same contract as the PostgreSQL adapter: atomic
//! conditional create and all-or-nothing batch writes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{BookingId, GroupId, RegistrationKey, SubjectId, Timestamp};
use crate::domain::registration::Registration;
use crate::ports::{CreateOutcome, RegistrationStore, RegistrationUpdate, StoreError};

#[derive(Default)]
struct Inner {
    records: HashMap<String, Registration>,
    /// Insertion order of keys, for group-member and subject listings.
    order: Vec<String>,
}

/// Registration store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryRegistrationStore {
    inner: Mutex<Inner>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: insert a record unconditionally.
    pub async fn seed(&self, registration: Registration) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let key = registration.key.as_str().to_string();
        if inner.records.insert(key.clone(), registration).is_none() {
            inner.order.push(key);
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn create_if_absent(
        &self,
        registration: Registration,
    ) -> Result<CreateOutcome, StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let key = registration.key.as_str().to_string();
        if let Some(existing) = inner.records.get(&key) {
            return Ok(CreateOutcome::AlreadyExists(existing.clone()));
        }
        inner.records.insert(key.clone(), registration);
        inner.order.push(key);
        Ok(CreateOutcome::Created)
    }

    async fn batch_create(&self, registrations: Vec<Registration>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");

        // Reject the whole batch before touching the map.
        for registration in &registrations {
            if inner.records.contains_key(registration.key.as_str()) {
                return Err(StoreError::Database(format!(
                    "duplicate key in batch: {}",
                    registration.key
                )));
            }
        }

        for registration in registrations {
            let key = registration.key.as_str().to_string();
            inner.records.insert(key.clone(), registration);
            inner.order.push(key);
        }
        Ok(())
    }

    async fn update(
        &self,
        key: &RegistrationKey,
        update: &RegistrationUpdate,
    ) -> Result<Registration, StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let record = inner
            .records
            .get_mut(key.as_str())
            .ok_or_else(|| StoreError::MissingRecord(key.clone()))?;

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(booking_id) = &update.booking_id {
            record.booking_id = Some(booking_id.clone());
        }
        if let Some(payment_url) = &update.payment_url {
            record.payment_url = payment_url.clone();
        }
        record.updated_at = Timestamp::now();

        Ok(record.clone())
    }

    async fn find_by_key(
        &self,
        key: &RegistrationKey,
    ) -> Result<Option<Registration>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.records.get(key.as_str()).cloned())
    }

    async fn find_by_booking_id(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<Registration>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .records
            .values()
            .find(|r| r.booking_id.as_ref() == Some(booking_id))
            .cloned())
    }

    async fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<Registration>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut found: Vec<Registration> = inner
            .order
            .iter()
            .rev()
            .filter_map(|key| inner.records.get(key))
            .filter(|r| &r.subject_id == subject_id)
            .cloned()
            .collect();
        // Insertion order reversed approximates newest-first; fall back to
        // timestamps when records were seeded out of order.
        found.sort_by(|a, b| b.created_at.as_datetime().cmp(a.created_at.as_datetime()));
        Ok(found)
    }

    async fn find_group_members(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<Registration>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .order
            .iter()
            .filter_map(|key| inner.records.get(key))
            .filter(|r| r.kind.group_id() == Some(group_id))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &RegistrationKey) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.records.remove(key.as_str());
        inner.order.retain(|k| k != key.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TicketId;
    use crate::domain::registration::{Gender, MemberRole, PaymentStatus, SubjectProfile};

    fn profile(name: &str) -> SubjectProfile {
        SubjectProfile {
            name: name.to_string(),
            email: format!("{}@example.com", name),
            phone: "+919876543210".to_string(),
            college: "NIT".to_string(),
            gender: Gender::Other,
        }
    }

    fn solo(subject: &str, ticket: u32) -> Registration {
        Registration::reserve_solo(
            SubjectId::new(subject).unwrap(),
            TicketId::new(ticket),
            profile(subject),
        )
    }

    #[tokio::test]
    async fn conditional_create_returns_existing_on_second_call() {
        let store = InMemoryRegistrationStore::new();
        let reg = solo("uid-1", 1);

        let first = store.create_if_absent(reg.clone()).await.unwrap();
        assert_eq!(first, CreateOutcome::Created);

        let second = store.create_if_absent(reg.clone()).await.unwrap();
        assert!(matches!(second, CreateOutcome::AlreadyExists(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn batch_create_is_all_or_nothing() {
        let store = InMemoryRegistrationStore::new();
        store.seed(solo("uid-dup", 7)).await;

        let batch = vec![solo("uid-a", 7), solo("uid-dup", 7), solo("uid-b", 7)];
        let result = store.batch_create(batch).await;

        assert!(result.is_err());
        // The duplicate poisoned the whole batch.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_merges_only_provided_fields() {
        let store = InMemoryRegistrationStore::new();
        let reg = solo("uid-1", 1);
        let key = reg.key.clone();
        store.seed(reg).await;

        let update = RegistrationUpdate::default()
            .with_booking(BookingId::new("bkg_9").unwrap())
            .with_payment_url("https://pay/bkg_9");
        let updated = store.update(&key, &update).await.unwrap();

        assert_eq!(updated.booking_id, Some(BookingId::new("bkg_9").unwrap()));
        assert_eq!(updated.payment_url, "https://pay/bkg_9");
        // Status untouched.
        assert_eq!(updated.status, PaymentStatus::PendingPayment);
    }

    #[tokio::test]
    async fn update_missing_key_reports_missing_record() {
        let store = InMemoryRegistrationStore::new();
        let key = RegistrationKey::from_raw("ghost:1");
        let err = store
            .update(&key, &RegistrationUpdate::status(PaymentStatus::Confirmed))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingRecord(_)));
    }

    #[tokio::test]
    async fn find_by_booking_id_matches_attached_booking() {
        let store = InMemoryRegistrationStore::new();
        let mut reg = solo("uid-1", 1);
        reg.booking_id = Some(BookingId::new("bkg_42").unwrap());
        store.seed(reg).await;

        let found = store
            .find_by_booking_id(&BookingId::new("bkg_42").unwrap())
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = store
            .find_by_booking_id(&BookingId::new("bkg_other").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn group_members_come_back_in_creation_order() {
        let store = InMemoryRegistrationStore::new();
        let group = GroupId::new();

        for (i, name) in ["cap", "vice", "m1"].iter().enumerate() {
            let booking = BookingId::new(format!("bkg_{}", i)).unwrap();
            store
                .seed(Registration::group_member(
                    SubjectId::new("owner").unwrap(),
                    TicketId::new(2626),
                    group,
                    MemberRole::Member,
                    booking,
                    PaymentStatus::PendingPayment,
                    "https://pay/group".to_string(),
                    profile(name),
                ))
                .await;
        }

        let members = store.find_group_members(group).await.unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.profile.name.as_str()).collect();
        assert_eq!(names, vec!["cap", "vice", "m1"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryRegistrationStore::new();
        let reg = solo("uid-1", 1);
        let key = reg.key.clone();
        store.seed(reg).await;

        store.delete(&key).await.unwrap();
        store.delete(&key).await.unwrap();
        assert!(store.is_empty());
    }
}
