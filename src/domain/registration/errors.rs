//! Registration-specific error taxonomy.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed / UnknownTicket / GroupSizeOutOfBounds | 400 |
//! | AlreadyRegistered | 409 |
//! | BookingInProgress | 409 |
//! | NotFound | 404 |
//! | Gateway | 502 |
//! | Store | 500 |
//!
//! The mapping itself lives in the HTTP adapter; the taxonomy is the contract.

use crate::domain::foundation::{RegistrationKey, SubjectId, TicketId, ValidationError};

/// Registration operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Malformed input; reported to the caller, never retried.
    ValidationFailed { field: String, message: String },

    /// The ticket id is not in the catalog.
    UnknownTicket(TicketId),

    /// Group member count violates the ticket's policy bounds.
    GroupSizeOutOfBounds {
        ticket: TicketId,
        min: usize,
        max: Option<usize>,
        actual: usize,
    },

    /// The subject already holds a confirmed registration for this ticket.
    AlreadyRegistered {
        subject: SubjectId,
        ticket: TicketId,
    },

    /// A concurrent booking attempt for the same key won the conditional
    /// create; this caller must not issue a second external booking.
    BookingInProgress { key: RegistrationKey },

    /// No registration exists for the queried key.
    NotFound(RegistrationKey),

    /// The booking provider was unreachable or answered malformed data.
    /// Transient; safe to retry the whole operation.
    Gateway { message: String, retryable: bool },

    /// Persistence failure. Single-record writes leave no partial state;
    /// group batches are all-or-nothing, so retry is safe.
    Store { message: String },
}

impl RegistrationError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RegistrationError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown_ticket(ticket: TicketId) -> Self {
        RegistrationError::UnknownTicket(ticket)
    }

    pub fn already_registered(subject: SubjectId, ticket: TicketId) -> Self {
        RegistrationError::AlreadyRegistered { subject, ticket }
    }

    pub fn booking_in_progress(key: RegistrationKey) -> Self {
        RegistrationError::BookingInProgress { key }
    }

    pub fn not_found(key: RegistrationKey) -> Self {
        RegistrationError::NotFound(key)
    }

    pub fn gateway(message: impl Into<String>, retryable: bool) -> Self {
        RegistrationError::Gateway {
            message: message.into(),
            retryable,
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        RegistrationError::Store {
            message: message.into(),
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            RegistrationError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            RegistrationError::UnknownTicket(ticket) => {
                format!("Unknown ticket: {}", ticket)
            }
            RegistrationError::GroupSizeOutOfBounds {
                ticket,
                min,
                max,
                actual,
            } => match max {
                Some(max) => format!(
                    "Ticket {} allows {} to {} members, got {}",
                    ticket, min, max, actual
                ),
                None => format!(
                    "Ticket {} requires at least {} members, got {}",
                    ticket, min, actual
                ),
            },
            RegistrationError::AlreadyRegistered { subject, ticket } => {
                format!("{} is already registered for ticket {}", subject, ticket)
            }
            RegistrationError::BookingInProgress { key } => {
                format!("A booking for {} is already in progress", key)
            }
            RegistrationError::NotFound(key) => {
                format!("No registration found for {}", key)
            }
            RegistrationError::Gateway { message, .. } => {
                format!("Booking provider error: {}", message)
            }
            RegistrationError::Store { message } => format!("Storage error: {}", message),
        }
    }

    /// Returns true if retrying the whole operation is safe and useful.
    pub fn is_retryable(&self) -> bool {
        match self {
            RegistrationError::Gateway { retryable, .. } => *retryable,
            RegistrationError::Store { .. } => true,
            _ => false,
        }
    }
}

impl From<ValidationError> for RegistrationError {
    fn from(err: ValidationError) -> Self {
        RegistrationError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RegistrationError {}
