//! BookSoloHandler - creates a solo registration backed by one booking.
//!
//! The conditional create happens BEFORE the provider call: the store write
//! reserves the registration key, so under concurrent requests for the same
//! subject and ticket exactly one caller reaches the provider. Every other
//! caller gets `BookingInProgress` and zero bookings are duplicated.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{TicketCatalog, TicketKind};
use crate::domain::foundation::{BookingId, RegistrationKey, SubjectId, TicketId};
use crate::domain::registration::{
    normalize_phone, PaymentStatus, Registration, RegistrationError, SubjectProfile,
};
use crate::ports::{
    BookingGateway, CreateBookingRequest, CreateOutcome, RegistrationStore, RegistrationUpdate,
};

/// Command to book a solo ticket.
#[derive(Debug, Clone)]
pub struct BookSoloCommand {
    pub subject_id: SubjectId,
    pub ticket_id: TicketId,
    pub profile: SubjectProfile,
}

/// A booked (or resumed) solo registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSoloResult {
    pub key: RegistrationKey,
    pub booking_id: BookingId,
    pub status: PaymentStatus,
    pub payment_url: String,
}

/// Handler for solo booking requests.
pub struct BookSoloHandler {
    store: Arc<dyn RegistrationStore>,
    gateway: Arc<dyn BookingGateway>,
    catalog: Arc<TicketCatalog>,
    payment_page_base_url: String,
}

impl BookSoloHandler {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        gateway: Arc<dyn BookingGateway>,
        catalog: Arc<TicketCatalog>,
        payment_page_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            catalog,
            payment_page_base_url: payment_page_base_url.into(),
        }
    }

    #[instrument(skip_all, fields(subject = %cmd.subject_id, ticket = %cmd.ticket_id))]
    pub async fn handle(&self, cmd: BookSoloCommand) -> Result<BookSoloResult, RegistrationError> {
        let policy = self
            .catalog
            .get(cmd.ticket_id)
            .ok_or(RegistrationError::UnknownTicket(cmd.ticket_id))?;
        if !matches!(policy.kind, TicketKind::Solo) {
            return Err(RegistrationError::validation(
                "ticket_id",
                "ticket requires a group booking",
            ));
        }

        cmd.profile.validate()?;
        let mut profile = cmd.profile.clone();
        profile.phone = normalize_phone(&profile.phone);

        let key = RegistrationKey::solo(&cmd.subject_id, cmd.ticket_id);

        // A record may already exist from an earlier attempt. Resume it if it
        // is still usable, otherwise purge it and book fresh.
        if let Some(existing) = self.store.find_by_key(&key).await? {
            if let Some(resumed) = self.resume_or_supersede(existing, &cmd).await? {
                return Ok(resumed);
            }
        }

        // Reserve the key. The race loser lands here with AlreadyExists and
        // never reaches the provider.
        let reservation =
            Registration::reserve_solo(cmd.subject_id.clone(), cmd.ticket_id, profile.clone());
        match self.store.create_if_absent(reservation).await? {
            CreateOutcome::Created => {}
            CreateOutcome::AlreadyExists(_) => {
                return Err(RegistrationError::booking_in_progress(key));
            }
        }

        let request = CreateBookingRequest {
            ticket_id: cmd.ticket_id.as_u32(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            metadata: serde_json::json!({
                "subject_id": cmd.subject_id.as_str(),
                "ticket": policy.name,
            }),
        };

        let created = match self.gateway.create_booking(request).await {
            Ok(created) => created,
            Err(err) => {
                // Release the reservation so a retry can book fresh.
                if let Err(cleanup) = self.store.delete(&key).await {
                    warn!(key = %key, error = %cleanup, "failed to release reservation after gateway error");
                }
                return Err(err.into());
            }
        };

        let booking_id = BookingId::new(created.booking_id)
            .map_err(|_| RegistrationError::gateway("provider returned empty booking id", false))?;

        let update = RegistrationUpdate::status(created.status)
            .with_booking(booking_id.clone())
            .with_payment_url(created.payment_url);
        let updated = self.store.update(&key, &update).await?;

        info!(key = %key, booking_id = %booking_id, status = %updated.status, "solo booking created");

        Ok(BookSoloResult {
            key,
            booking_id,
            status: updated.status,
            payment_url: updated.payment_url,
        })
    }

    /// Decide what to do with a pre-existing record for this key.
    ///
    /// Returns `Some` when the caller should receive an existing booking,
    /// `None` when the record was purged and a fresh booking should proceed.
    async fn resume_or_supersede(
        &self,
        existing: Registration,
        cmd: &BookSoloCommand,
    ) -> Result<Option<BookSoloResult>, RegistrationError> {
        if existing.status.is_confirmed() {
            return Err(RegistrationError::already_registered(
                cmd.subject_id.clone(),
                cmd.ticket_id,
            ));
        }

        // Failed bookings and abandoned reservations are purged and
        // superseded by a fresh attempt.
        let booking_id = match &existing.booking_id {
            Some(id) if existing.status == PaymentStatus::PendingPayment => id.clone(),
            _ => {
                info!(key = %existing.key, status = %existing.status, "superseding stale registration");
                self.store.delete(&existing.key).await?;
                return Ok(None);
            }
        };

        // Pending with a payment URL: hand the same booking back.
        if !existing.payment_url.is_empty() {
            return Ok(Some(BookSoloResult {
                key: existing.key,
                booking_id,
                status: existing.status,
                payment_url: existing.payment_url,
            }));
        }

        // Pending but the payment URL was never stored. Ask the provider
        // where this booking stands before deciding.
        let snapshot = self.gateway.fetch_booking(booking_id.as_str()).await?;
        let merged = existing.status.merge(snapshot.status);

        if merged.is_confirmed() {
            self.store
                .update(&existing.key, &RegistrationUpdate::status(merged))
                .await?;
            return Err(RegistrationError::already_registered(
                cmd.subject_id.clone(),
                cmd.ticket_id,
            ));
        }

        if merged == PaymentStatus::PendingPayment {
            if let Some(payment_id) = snapshot.payment_id {
                // Rebuild the payment URL from the provider's payment id.
                let payment_url = format!("{}{}", self.payment_page_base_url, payment_id);
                let updated = self
                    .store
                    .update(
                        &existing.key,
                        &RegistrationUpdate::status(merged).with_payment_url(payment_url),
                    )
                    .await?;
                return Ok(Some(BookSoloResult {
                    key: updated.key,
                    booking_id,
                    status: updated.status,
                    payment_url: updated.payment_url,
                }));
            }
        }

        // Failed on the provider side, or pending with no payment to point
        // at. Purge and book fresh.
        info!(key = %existing.key, provider_status = %snapshot.status, "purging unusable registration");
        self.store.delete(&existing.key).await?;
        Ok(None)
    }
}
