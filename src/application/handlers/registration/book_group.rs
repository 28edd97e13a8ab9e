//! BookGroupHandler - books a bulk ticket and fans out one registration per
//! member.
//!
//! The provider is called once; the member records are written in a single
//! all-or-nothing batch keyed by the provider's child booking ids. A failed
//! provider call therefore writes nothing, and a failed batch leaves no
//! partial group behind.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{TicketCatalog, TicketKind};
use crate::domain::foundation::{BookingId, GroupId, RegistrationKey, SubjectId, TicketId};
use crate::domain::registration::{
    normalize_phone, order_for_display, GroupMember, MemberRole, PaymentStatus, Registration,
    RegistrationError, SubjectProfile,
};
use crate::ports::{
    BookingGateway, BulkMemberRequest, CreateBulkBookingRequest, GatewayError, RegistrationStore,
};

/// Command to book a group ticket for several members.
#[derive(Debug, Clone)]
pub struct BookGroupCommand {
    /// The authenticated subject paying for the group.
    pub subject_id: SubjectId,
    pub ticket_id: TicketId,
    pub college: String,
    /// Members in request order; the provider returns child bookings in the
    /// same order.
    pub members: Vec<GroupMember>,
}

/// One booked member of the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedMember {
    pub key: RegistrationKey,
    pub booking_id: BookingId,
    pub name: String,
    pub role: MemberRole,
    pub status: PaymentStatus,
}

/// A booked group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookGroupResult {
    pub group_id: GroupId,
    pub parent_booking_id: BookingId,
    /// One payment URL covers the whole group.
    pub payment_url: String,
    pub members: Vec<BookedMember>,
}

/// Handler for group booking requests.
pub struct BookGroupHandler {
    store: Arc<dyn RegistrationStore>,
    gateway: Arc<dyn BookingGateway>,
    catalog: Arc<TicketCatalog>,
}

impl BookGroupHandler {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        gateway: Arc<dyn BookingGateway>,
        catalog: Arc<TicketCatalog>,
    ) -> Self {
        Self {
            store,
            gateway,
            catalog,
        }
    }

    #[instrument(skip_all, fields(subject = %cmd.subject_id, ticket = %cmd.ticket_id, members = cmd.members.len()))]
    pub async fn handle(
        &self,
        cmd: BookGroupCommand,
    ) -> Result<BookGroupResult, RegistrationError> {
        let policy = self
            .catalog
            .get(cmd.ticket_id)
            .ok_or(RegistrationError::UnknownTicket(cmd.ticket_id))?;
        let (min, max) = match policy.kind {
            TicketKind::Group {
                min_members,
                max_members,
            } => (min_members, max_members),
            TicketKind::Solo => {
                return Err(RegistrationError::validation(
                    "ticket_id",
                    "ticket requires a solo booking",
                ));
            }
        };

        let count = cmd.members.len();
        if count < min || max.is_some_and(|max| count > max) {
            return Err(RegistrationError::GroupSizeOutOfBounds {
                ticket: cmd.ticket_id,
                min,
                max,
                actual: count,
            });
        }

        let mut members = cmd.members.clone();
        for (index, member) in members.iter_mut().enumerate() {
            member.validate().map_err(|err| {
                RegistrationError::validation(
                    format!("members[{}].{}", index, err.field()),
                    err.to_string(),
                )
            })?;
            member.phone = normalize_phone(&member.phone);
        }

        // Payer contact: captain when one is named, otherwise the first
        // member as submitted.
        let payer = order_for_display(&members)[0].clone();

        let request = CreateBulkBookingRequest {
            ticket_id: cmd.ticket_id.as_u32(),
            payer_name: payer.name.clone(),
            payer_email: payer.email.clone(),
            payer_phone: payer.phone.clone(),
            members: members
                .iter()
                .enumerate()
                .map(|(index, m)| BulkMemberRequest {
                    name: m.name.clone(),
                    email: m.email.clone(),
                    phone: m.phone.clone(),
                    metadata: serde_json::json!({
                        "index": index,
                        "role": m.role.to_string(),
                    }),
                })
                .collect(),
            metadata: serde_json::json!({
                "subject_id": cmd.subject_id.as_str(),
                "ticket": policy.name,
            }),
        };

        let bulk = self.gateway.create_bulk_booking(request).await?;
        if bulk.children.len() != members.len() {
            return Err(GatewayError::ChildCountMismatch {
                requested: members.len(),
                returned: bulk.children.len(),
            }
            .into());
        }

        let parent_booking_id = BookingId::new(bulk.parent_booking_id)
            .map_err(|_| RegistrationError::gateway("provider returned empty booking id", false))?;

        let group_id = GroupId::new();
        let mut registrations = Vec::with_capacity(members.len());
        let mut booked = Vec::with_capacity(members.len());

        for (member, child) in members.iter().zip(bulk.children) {
            let booking_id = BookingId::new(child.booking_id).map_err(|_| {
                RegistrationError::gateway("provider returned empty child booking id", false)
            })?;

            let registration = Registration::group_member(
                cmd.subject_id.clone(),
                cmd.ticket_id,
                group_id,
                member.role,
                booking_id.clone(),
                child.status,
                bulk.payment_url.clone(),
                SubjectProfile {
                    name: member.name.clone(),
                    email: member.email.clone(),
                    phone: member.phone.clone(),
                    college: cmd.college.clone(),
                    gender: member.gender,
                },
            );

            booked.push(BookedMember {
                key: registration.key.clone(),
                booking_id,
                name: member.name.clone(),
                role: member.role,
                status: child.status,
            });
            registrations.push(registration);
        }

        self.store.batch_create(registrations).await?;

        info!(
            group_id = %group_id,
            parent = %parent_booking_id,
            members = booked.len(),
            "group booking created"
        );

        Ok(BookGroupResult {
            group_id,
            parent_booking_id,
            payment_url: bulk.payment_url,
            members: booked,
        })
    }
}
