//! ListRegistrationsHandler - listings for subjects and groups.

use std::sync::Arc;

use crate::domain::foundation::{GroupId, SubjectId};
use crate::domain::registration::{Registration, RegistrationError, RegistrationKind};
use crate::ports::RegistrationStore;

/// Query for all registrations a subject owns.
#[derive(Debug, Clone)]
pub struct ListRegistrationsQuery {
    pub subject_id: SubjectId,
}

/// Query for the members of one group.
#[derive(Debug, Clone)]
pub struct ListGroupQuery {
    pub group_id: GroupId,
}

/// Handler for registration listings.
pub struct ListRegistrationsHandler {
    store: Arc<dyn RegistrationStore>,
}

impl ListRegistrationsHandler {
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    /// All registrations owned by a subject, newest first.
    pub async fn by_subject(
        &self,
        query: ListRegistrationsQuery,
    ) -> Result<Vec<Registration>, RegistrationError> {
        Ok(self.store.find_by_subject(&query.subject_id).await?)
    }

    /// Members of one group: captain first, then vice-captain, then the
    /// rest in creation order.
    pub async fn group_members(
        &self,
        query: ListGroupQuery,
    ) -> Result<Vec<Registration>, RegistrationError> {
        let mut members = self.store.find_group_members(query.group_id).await?;
        members.sort_by_key(|r| match &r.kind {
            RegistrationKind::GroupMember { role, .. } => role.display_rank(),
            RegistrationKind::Solo => u8::MAX,
        });
        Ok(members)
    }
}
