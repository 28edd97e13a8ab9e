//! ProcessWebhookHandler - command handler for provider webhook deliveries.
//!
//! Token verification happens at the HTTP boundary; by the time a command
//! reaches this handler the delivery is authenticated. The payload is only
//! trusted as an index: the handler re-fetches the named booking from the
//! provider and merges the fresh status.

use std::sync::Arc;

use crate::application::reconciliation::{PushOutcome, ReconciliationEngine};
use crate::domain::foundation::BookingId;
use crate::domain::registration::RegistrationError;

/// Command carrying the booking id named by a webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    pub booking_id: BookingId,
}

/// Handler for webhook deliveries.
pub struct ProcessWebhookHandler {
    engine: Arc<ReconciliationEngine>,
}

impl ProcessWebhookHandler {
    pub fn new(engine: Arc<ReconciliationEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<PushOutcome, RegistrationError> {
        self.engine.push(&cmd.booking_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::MockBookingGateway;
    use crate::adapters::memory::InMemoryRegistrationStore;
    use crate::domain::foundation::{SubjectId, TicketId};
    use crate::domain::registration::{
        Gender, PaymentStatus, Registration, SubjectProfile,
    };
    use crate::ports::BookingSnapshot;

    #[tokio::test]
    async fn delivery_for_known_booking_updates_the_record() {
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
        store.seed(reg).await;

        let gateway = Arc::new(MockBookingGateway::new().with_snapshot(BookingSnapshot {
            booking_id: "bkg_1".to_string(),
            status: PaymentStatus::Confirmed,
            payment_id: None,
        }));

        let engine = Arc::new(ReconciliationEngine::new(store, gateway));
        let handler = ProcessWebhookHandler::new(engine);

        let outcome = handler
            .handle(ProcessWebhookCommand {
                booking_id: BookingId::new("bkg_1").unwrap(),
            })
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            PushOutcome::Updated {
                status: PaymentStatus::Confirmed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delivery_for_unknown_booking_is_unmatched() {
        let store = Arc::new(InMemoryRegistrationStore::new());
        let gateway = Arc::new(MockBookingGateway::new());
        let engine = Arc::new(ReconciliationEngine::new(store, gateway));
        let handler = ProcessWebhookHandler::new(engine);

        let outcome = handler
            .handle(ProcessWebhookCommand {
                booking_id: BookingId::new("bkg_ghost").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, PushOutcome::Unmatched);
    }
}
