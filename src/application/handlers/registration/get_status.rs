//! GetStatusHandler - query handler for one registration's current state.
//!
//! Reads are reconciling: a pending registration is refreshed from the
//! provider before being returned, so callers always see the provider's
//! latest word without a separate sync step.

use std::sync::Arc;

use crate::application::reconciliation::ReconciliationEngine;
use crate::domain::foundation::RegistrationKey;
use crate::domain::registration::{Registration, RegistrationError};

/// Query for a registration's status.
#[derive(Debug, Clone)]
pub struct GetStatusQuery {
    pub key: RegistrationKey,
}

/// Handler for status queries.
pub struct GetStatusHandler {
    engine: Arc<ReconciliationEngine>,
}

impl GetStatusHandler {
    pub fn new(engine: Arc<ReconciliationEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(&self, query: GetStatusQuery) -> Result<Registration, RegistrationError> {
        self.engine.pull(&query.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockBookingGateway;
    use crate::adapters::memory::InMemoryRegistrationStore;
    use crate::domain::foundation::{BookingId, SubjectId, TicketId};
    use crate::domain::registration::{Gender, PaymentStatus, SubjectProfile};
    use crate::ports::BookingSnapshot;

    #[tokio::test]
    async fn returns_the_reconciled_record() {
        let store = Arc::new(InMemoryRegistrationStore::new());
        let mut reg = Registration::reserve_solo(
            SubjectId::new("uid-1").unwrap(),
            TicketId::new(2605),
            SubjectProfile {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "+919876543210".to_string(),
                college: "NIT".to_string(),
                gender: Gender::Female,
            },
        );
        reg.booking_id = Some(BookingId::new("bkg_1").unwrap());
        let key = reg.key.clone();
        store.seed(reg).await;

        let gateway = Arc::new(MockBookingGateway::new().with_snapshot(BookingSnapshot {
            booking_id: "bkg_1".to_string(),
            status: PaymentStatus::Confirmed,
            payment_id: None,
        }));

        let engine = Arc::new(ReconciliationEngine::new(store, gateway));
        let handler = GetStatusHandler::new(engine);

        let result = handler.handle(GetStatusQuery { key }).await.unwrap();
        assert_eq!(result.status, PaymentStatus::Confirmed);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = Arc::new(InMemoryRegistrationStore::new());
        let gateway = Arc::new(MockBookingGateway::new());
        let engine = Arc::new(ReconciliationEngine::new(store, gateway));
        let handler = GetStatusHandler::new(engine);

        let err = handler
            .handle(GetStatusQuery {
                key: RegistrationKey::from_raw("nobody:1"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::NotFound(_)));
    }
}
