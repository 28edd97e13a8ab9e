//! Group membership value objects and display ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Self-reported gender of a member (provider metadata field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Role of a member within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberRole {
    Captain,
    ViceCaptain,
    Member,
}

impl MemberRole {
    /// Display rank: Captain first, then Vice-Captain, then everyone else.
    ///
    /// Unranked members keep their relative insertion order, so ordering by
    /// this rank with a stable sort is deterministic.
    pub fn display_rank(&self) -> u8 {
        match self {
            MemberRole::Captain => 0,
            MemberRole::ViceCaptain => 1,
            MemberRole::Member => 2,
        }
    }
}

impl Default for MemberRole {
    fn default() -> Self {
        MemberRole::Member
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberRole::Captain => "captain",
            MemberRole::ViceCaptain => "vice-captain",
            MemberRole::Member => "member",
        };
        write!(f, "{}", s)
    }
}

/// One member of a group booking request, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: Gender,
    #[serde(default)]
    pub role: MemberRole,
}

impl GroupMember {
    /// Validates the member's contact fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing '@'"));
        }
        if self.phone.trim().len() < 10 {
            return Err(ValidationError::invalid_format(
                "phone",
                "must be at least 10 digits",
            ));
        }
        Ok(())
    }
}

/// Normalizes a phone number to E.164 with the +91 default country code.
///
/// The provider rejects bare national numbers, so a 10-digit number gains
/// `+91` and a 12-digit number starting with `91` gains `+`. Anything
/// already carrying `+` passes through untouched.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        return trimmed.to_string();
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("+91{}", digits)
    } else if digits.len() == 12 && digits.starts_with("91") {
        format!("+{}", digits)
    } else {
        trimmed.to_string()
    }
}

/// Orders members for display: captain, vice-captain, then insertion order.
///
/// Stable and deterministic so downstream exports are reproducible.
pub fn order_for_display(members: &[GroupMember]) -> Vec<&GroupMember> {
    let mut ordered: Vec<&GroupMember> = members.iter().collect();
    ordered.sort_by_key(|m| m.role.display_rank());
    ordered
}
