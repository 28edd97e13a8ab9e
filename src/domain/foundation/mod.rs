//! Foundation module - Shared domain primitives.
//!
//! Contains the identifier value objects, timestamps and validation errors
//! that form the vocabulary of the registration domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{BookingId, GroupId, RegistrationKey, SubjectId, TicketId};
pub use timestamp::Timestamp;
