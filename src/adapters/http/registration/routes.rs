//! Route definitions for registration endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    book_group, book_solo, get_group_members, get_registration, list_registrations,
    RegistrationAppState,
};

/// Builds the registration route tree.
///
/// Nested under `/api` by the composition root.
pub fn registration_routes() -> Router<RegistrationAppState> {
    Router::new()
        .route("/registrations", get(list_registrations))
        .route("/registrations/solo", post(book_solo))
        .route("/registrations/group", post(book_group))
        .route("/registrations/:key", get(get_registration))
        .route("/groups/:group_id", get(get_group_members))
}
