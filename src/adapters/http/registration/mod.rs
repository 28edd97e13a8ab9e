//! HTTP adapter for registration endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedSubject, RegistrationApiError, RegistrationAppState};
pub use routes::registration_routes;
