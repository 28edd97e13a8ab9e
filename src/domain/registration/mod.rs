//! Registration domain - records, payment status and group membership.

mod errors;
mod group;
mod record;
mod status;

pub use errors::RegistrationError;
pub use group::{normalize_phone, order_for_display, Gender, GroupMember, MemberRole};
pub use record::{Registration, RegistrationKind, SubjectProfile};
pub use status::{PaymentStatus, UnknownStatus};
