//! Ticket catalog configuration.
//!
//! The catalog maps provider ticket ids to booking policies (solo or group,
//! with member bounds). It is read once from a YAML file at startup and
//! passed by reference to the handlers; nothing re-reads it per request.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::foundation::TicketId;

use super::error::{ConfigError, ValidationError};

/// Location of the ticket catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketsConfig {
    /// Path to the YAML catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> String {
    "tickets.yaml".to_string()
}

/// Booking policy for one ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketPolicy {
    pub id: u32,
    pub name: String,
    #[serde(flatten)]
    pub kind: TicketKind,
}

/// Whether a ticket books one subject or a group.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TicketKind {
    Solo,
    Group {
        min_members: usize,
        /// Open upper bound when absent.
        max_members: Option<usize>,
    },
}

/// The loaded catalog, indexed by ticket id.
#[derive(Debug, Clone)]
pub struct TicketCatalog {
    tickets: HashMap<u32, TicketPolicy>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tickets: Vec<TicketPolicy>,
}

impl TicketCatalog {
    /// Load and validate the catalog from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse a catalog from YAML text.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_yaml::from_str(raw)?;
        Self::from_policies(file.tickets).map_err(ConfigError::ValidationFailed)
    }

    /// Build a catalog from already-parsed policies.
    pub fn from_policies(policies: Vec<TicketPolicy>) -> Result<Self, ValidationError> {
        let mut tickets = HashMap::with_capacity(policies.len());
        for policy in policies {
            if let TicketKind::Group {
                min_members,
                max_members,
            } = policy.kind
            {
                // A group booking always carries at least one member.
                if min_members == 0 {
                    return Err(ValidationError::EmptyGroupBound(policy.id));
                }
                if max_members.is_some_and(|max| min_members > max) {
                    return Err(ValidationError::InvalidTicketBounds(policy.id));
                }
            }
            let id = policy.id;
            if tickets.insert(id, policy).is_some() {
                return Err(ValidationError::DuplicateTicket(id));
            }
        }
        Ok(Self { tickets })
    }

    pub fn get(&self, id: TicketId) -> Option<&TicketPolicy> {
        self.tickets.get(&id.as_u32())
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
tickets:
  - id: 2605
    name: "Alumni Pass"
    kind: solo
  - id: 2626
    name: "Hostel Bed"
    kind: group
    min_members: 1
  - id: 2710
    name: "Dance Crew"
    kind: group
    min_members: 4
    max_members: 12
"#;

    #[test]
    fn parses_solo_and_group_policies() {
        let catalog = TicketCatalog::parse(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);

        let solo = catalog.get(TicketId::new(2605)).unwrap();
        assert!(matches!(solo.kind, TicketKind::Solo));

        let open = catalog.get(TicketId::new(2626)).unwrap();
        assert!(matches!(
            open.kind,
            TicketKind::Group {
                min_members: 1,
                max_members: None
            }
        ));
    }

    #[test]
    fn unknown_ids_return_none() {
        let catalog = TicketCatalog::parse(SAMPLE).unwrap();
        assert!(catalog.get(TicketId::new(9999)).is_none());
    }

    #[test]
    fn rejects_inverted_member_bounds() {
        let policies = vec![TicketPolicy {
            id: 1,
            name: "Bad".to_string(),
            kind: TicketKind::Group {
                min_members: 10,
                max_members: Some(2),
            },
        }];
        assert!(TicketCatalog::from_policies(policies).is_err());
    }

    #[test]
    fn rejects_zero_member_group_bound() {
        // min_members 0 would let an empty member list through the
        // booking-time bounds check.
        let policies = vec![TicketPolicy {
            id: 7,
            name: "Empty".to_string(),
            kind: TicketKind::Group {
                min_members: 0,
                max_members: None,
            },
        }];
        assert!(matches!(
            TicketCatalog::from_policies(policies),
            Err(ValidationError::EmptyGroupBound(7))
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mk = |id| TicketPolicy {
            id,
            name: "Dup".to_string(),
            kind: TicketKind::Solo,
        };
        assert!(TicketCatalog::from_policies(vec![mk(5), mk(5)]).is_err());
    }
}
