//! Reconciliation engine: converges stored payment status with the provider.
//!
//! Two paths feed the same merge rule ([`PaymentStatus::merge`]):
//!
//! - **pull**: a read request refreshes one registration on demand
//! - **push**: a webhook delivery names a booking that changed
//!
//! Both paths skip the provider entirely once a registration is confirmed,
//! so a confirmed record costs zero gateway calls forever after.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::foundation::{BookingId, RegistrationKey};
use crate::domain::registration::{PaymentStatus, Registration, RegistrationError};
use crate::ports::{BookingGateway, RegistrationStore, RegistrationUpdate};

/// Outcome of a push reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The registration's status changed and was persisted.
    Updated {
        key: RegistrationKey,
        status: PaymentStatus,
    },

    /// The registration was already up to date (or already confirmed).
    Unchanged { key: RegistrationKey },

    /// No registration holds the delivered booking id. Acknowledged so the
    /// provider stops retrying; the pull path will catch up later if the
    /// record appears.
    Unmatched,
}

/// Converges stored registrations with the booking provider.
pub struct ReconciliationEngine {
    store: Arc<dyn RegistrationStore>,
    gateway: Arc<dyn BookingGateway>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn RegistrationStore>, gateway: Arc<dyn BookingGateway>) -> Self {
        Self { store, gateway }
    }

    /// Pull path: refresh one registration from the provider.
    ///
    /// Confirmed registrations are returned as stored without touching the
    /// gateway. Reservations that never got a booking id have nothing to
    /// reconcile and are also returned as stored.
    pub async fn pull(&self, key: &RegistrationKey) -> Result<Registration, RegistrationError> {
        let stored = self
            .store
            .find_by_key(key)
            .await?
            .ok_or_else(|| RegistrationError::not_found(key.clone()))?;

        if stored.status.is_confirmed() {
            debug!(key = %key, "registration already confirmed, skipping provider fetch");
            return Ok(stored);
        }

        let booking_id = match &stored.booking_id {
            Some(id) => id.clone(),
            None => return Ok(stored),
        };

        let snapshot = self.gateway.fetch_booking(booking_id.as_str()).await?;
        let merged = stored.status.merge(snapshot.status);

        if merged == stored.status {
            return Ok(stored);
        }

        info!(key = %key, from = %stored.status, to = %merged, "pull reconciliation updating status");
        let updated = self
            .store
            .update(key, &RegistrationUpdate::status(merged))
            .await?;
        Ok(updated)
    }

    /// Push path: a webhook named this booking; re-fetch and merge.
    ///
    /// The webhook payload is treated as an index only. The authoritative
    /// status always comes from a fresh provider fetch, so a forged or stale
    /// payload body can never corrupt stored state.
    pub async fn push(&self, booking_id: &BookingId) -> Result<PushOutcome, RegistrationError> {
        let stored = match self.store.find_by_booking_id(booking_id).await? {
            Some(record) => record,
            None => {
                warn!(booking_id = %booking_id, "webhook for unknown booking");
                return Ok(PushOutcome::Unmatched);
            }
        };

        if stored.status.is_confirmed() {
            return Ok(PushOutcome::Unchanged { key: stored.key });
        }

        let snapshot = self.gateway.fetch_booking(booking_id.as_str()).await?;
        let merged = stored.status.merge(snapshot.status);

        if merged == stored.status {
            return Ok(PushOutcome::Unchanged { key: stored.key });
        }

        info!(key = %stored.key, from = %stored.status, to = %merged, "push reconciliation updating status");
        self.store
            .update(&stored.key, &RegistrationUpdate::status(merged))
            .await?;

        Ok(PushOutcome::Updated {
            key: stored.key,
            status: merged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockBookingGateway;
    use crate::adapters::memory::InMemoryRegistrationStore;
    use crate::domain::foundation::{SubjectId, TicketId};
    use crate::domain::registration::{Gender, SubjectProfile};
    use crate::ports::{BookingSnapshot, GatewayError};

    fn profile() -> SubjectProfile {
        SubjectProfile {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+919876543210".to_string(),
            college: "NIT".to_string(),
            gender: Gender::Female,
        }
    }

    fn booked_registration(status: PaymentStatus) -> Registration {
        let mut reg = Registration::reserve_solo(
            SubjectId::new("uid-1").unwrap(),
            TicketId::new(2605),
            profile(),
        );
        reg.booking_id = Some(BookingId::new("bkg_1").unwrap());
        reg.payment_url = "https://pay/bkg_1".to_string();
        reg.status = status;
        reg
    }

    fn snapshot(status: PaymentStatus) -> BookingSnapshot {
        BookingSnapshot {
            booking_id: "bkg_1".to_string(),
            status,
            payment_id: Some("pay_1".to_string()),
        }
    }

    async fn seeded_store(reg: Registration) -> Arc<InMemoryRegistrationStore> {
        let store = Arc::new(InMemoryRegistrationStore::new());
        store.seed(reg).await;
        store
    }

    #[tokio::test]
    async fn pull_skips_gateway_for_confirmed_records() {
        let reg = booked_registration(PaymentStatus::Confirmed);
        let key = reg.key.clone();
        let store = seeded_store(reg).await;
        let gateway = Arc::new(MockBookingGateway::new());

        let engine = ReconciliationEngine::new(store, gateway.clone());
        let result = engine.pull(&key).await.unwrap();

        assert_eq!(result.status, PaymentStatus::Confirmed);
        assert_eq!(gateway.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn pull_adopts_provider_confirmation() {
        let reg = booked_registration(PaymentStatus::PendingPayment);
        let key = reg.key.clone();
        let store = seeded_store(reg).await;
        let gateway = Arc::new(
            MockBookingGateway::new().with_snapshot(snapshot(PaymentStatus::Confirmed)),
        );

        let engine = ReconciliationEngine::new(store.clone(), gateway.clone());
        let result = engine.pull(&key).await.unwrap();

        assert_eq!(result.status, PaymentStatus::Confirmed);
        assert_eq!(gateway.fetch_calls(), 1);

        // Persisted, not just returned.
        let stored = store.find_by_key(&key).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn pull_returns_stored_when_provider_agrees() {
        let reg = booked_registration(PaymentStatus::PendingPayment);
        let key = reg.key.clone();
        let store = seeded_store(reg).await;
        let gateway = Arc::new(
            MockBookingGateway::new().with_snapshot(snapshot(PaymentStatus::PendingPayment)),
        );

        let engine = ReconciliationEngine::new(store, gateway);
        let result = engine.pull(&key).await.unwrap();

        assert_eq!(result.status, PaymentStatus::PendingPayment);
    }

    #[tokio::test]
    async fn pull_timeout_is_retryable_and_leaves_stored_state_untouched() {
        let reg = booked_registration(PaymentStatus::PendingPayment);
        let key = reg.key.clone();
        let store = seeded_store(reg).await;
        let gateway = Arc::new(MockBookingGateway::new().with_fetch_error(GatewayError::Timeout));

        let engine = ReconciliationEngine::new(store.clone(), gateway.clone());
        let err = engine.pull(&key).await.unwrap_err();

        // No response is a transient failure, never a status.
        assert!(matches!(err, RegistrationError::Gateway { .. }));
        assert!(err.is_retryable());
        assert_eq!(gateway.fetch_calls(), 1);

        let stored = store.find_by_key(&key).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::PendingPayment);
        assert_eq!(stored.payment_url, "https://pay/bkg_1");
    }

    #[tokio::test]
    async fn pull_of_missing_key_is_not_found() {
        let store = Arc::new(InMemoryRegistrationStore::new());
        let gateway = Arc::new(MockBookingGateway::new());
        let engine = ReconciliationEngine::new(store, gateway);

        let key = RegistrationKey::from_raw("nobody:1");
        let err = engine.pull(&key).await.unwrap_err();
        assert!(matches!(err, RegistrationError::NotFound(_)));
    }

    #[tokio::test]
    async fn push_refetches_and_updates() {
        let reg = booked_registration(PaymentStatus::PendingPayment);
        let key = reg.key.clone();
        let store = seeded_store(reg).await;
        let gateway = Arc::new(
            MockBookingGateway::new().with_snapshot(snapshot(PaymentStatus::Confirmed)),
        );

        let engine = ReconciliationEngine::new(store.clone(), gateway.clone());
        let booking = BookingId::new("bkg_1").unwrap();
        let outcome = engine.push(&booking).await.unwrap();

        assert_eq!(
            outcome,
            PushOutcome::Updated {
                key: key.clone(),
                status: PaymentStatus::Confirmed,
            }
        );
        assert_eq!(gateway.fetch_calls(), 1);

        let stored = store.find_by_key(&key).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn push_for_confirmed_record_is_unchanged_without_fetch() {
        let reg = booked_registration(PaymentStatus::Confirmed);
        let key = reg.key.clone();
        let store = seeded_store(reg).await;
        let gateway = Arc::new(MockBookingGateway::new());

        let engine = ReconciliationEngine::new(store, gateway.clone());
        let booking = BookingId::new("bkg_1").unwrap();
        let outcome = engine.push(&booking).await.unwrap();

        assert_eq!(outcome, PushOutcome::Unchanged { key });
        assert_eq!(gateway.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn push_for_unknown_booking_is_unmatched() {
        let store = Arc::new(InMemoryRegistrationStore::new());
        let gateway = Arc::new(MockBookingGateway::new());
        let engine = ReconciliationEngine::new(store, gateway);

        let booking = BookingId::new("bkg_ghost").unwrap();
        let outcome = engine.push(&booking).await.unwrap();
        assert_eq!(outcome, PushOutcome::Unmatched);
    }

    #[tokio::test]
    async fn duplicate_confirmations_converge() {
        let reg = booked_registration(PaymentStatus::PendingPayment);
        let store = seeded_store(reg).await;
        let gateway = Arc::new(
            MockBookingGateway::new().with_snapshot(snapshot(PaymentStatus::Confirmed)),
        );

        let engine = ReconciliationEngine::new(store.clone(), gateway);
        let booking = BookingId::new("bkg_1").unwrap();

        let first = engine.push(&booking).await.unwrap();
        let second = engine.push(&booking).await.unwrap();

        assert!(matches!(first, PushOutcome::Updated { .. }));
        assert!(matches!(second, PushOutcome::Unchanged { .. }));
    }
}
