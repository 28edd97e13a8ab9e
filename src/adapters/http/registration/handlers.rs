//! HTTP handlers for registration endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::registration::{
    BookGroupCommand, BookGroupHandler, BookSoloCommand, BookSoloHandler, GetStatusHandler,
    GetStatusQuery, ListGroupQuery, ListRegistrationsHandler, ListRegistrationsQuery,
    ProcessWebhookHandler,
};
use crate::application::reconciliation::ReconciliationEngine;
use crate::config::TicketCatalog;
use crate::domain::foundation::{GroupId, RegistrationKey, SubjectId, TicketId};
use crate::domain::registration::{RegistrationError, SubjectProfile};
use crate::ports::{BookingGateway, RegistrationStore};

use super::dto::{
    BookGroupRequest, BookGroupResponse, BookSoloRequest, BookSoloResponse, ErrorResponse,
    GroupMembersResponse, RegistrationListResponse, RegistrationResponse,
};

/// Shared application state for registration endpoints.
///
/// Cloned per request; all dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct RegistrationAppState {
    pub store: Arc<dyn RegistrationStore>,
    pub gateway: Arc<dyn BookingGateway>,
    pub catalog: Arc<TicketCatalog>,
    pub engine: Arc<ReconciliationEngine>,
    pub payment_page_base_url: String,
}

impl RegistrationAppState {
    pub fn book_solo_handler(&self) -> BookSoloHandler {
        BookSoloHandler::new(
            self.store.clone(),
            self.gateway.clone(),
            self.catalog.clone(),
            self.payment_page_base_url.clone(),
        )
    }

    pub fn book_group_handler(&self) -> BookGroupHandler {
        BookGroupHandler::new(self.store.clone(), self.gateway.clone(), self.catalog.clone())
    }

    pub fn get_status_handler(&self) -> GetStatusHandler {
        GetStatusHandler::new(self.engine.clone())
    }

    pub fn list_handler(&self) -> ListRegistrationsHandler {
        ListRegistrationsHandler::new(self.store.clone())
    }

    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(self.engine.clone())
    }
}

/// Authenticated subject extracted from the request.
///
/// In production this is populated by the auth middleware from a verified
/// token; for development an `X-Subject-Id` header is accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject {
    pub subject_id: SubjectId,
}

/// Rejection type for AuthenticatedSubject extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedSubject
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let subject_id = parts
                .headers
                .get("X-Subject-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| SubjectId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedSubject { subject_id })
        })
    }
}

/// POST /api/registrations/solo - Book a solo ticket
pub async fn book_solo(
    State(state): State<RegistrationAppState>,
    subject: AuthenticatedSubject,
    Json(request): Json<BookSoloRequest>,
) -> Result<impl IntoResponse, RegistrationApiError> {
    let handler = state.book_solo_handler();
    let cmd = BookSoloCommand {
        subject_id: subject.subject_id,
        ticket_id: TicketId::new(request.ticket_id),
        profile: SubjectProfile {
            name: request.name,
            email: request.email,
            phone: request.phone,
            college: request.college,
            gender: request.gender,
        },
    };

    let result = handler.handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(BookSoloResponse::from(result))))
}

/// POST /api/registrations/group - Book a group ticket
pub async fn book_group(
    State(state): State<RegistrationAppState>,
    subject: AuthenticatedSubject,
    Json(request): Json<BookGroupRequest>,
) -> Result<impl IntoResponse, RegistrationApiError> {
    let handler = state.book_group_handler();
    let cmd = BookGroupCommand {
        subject_id: subject.subject_id,
        ticket_id: TicketId::new(request.ticket_id),
        college: request.college,
        members: request.members,
    };

    let result = handler.handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(BookGroupResponse::from(result))))
}

/// GET /api/registrations - List the caller's registrations
pub async fn list_registrations(
    State(state): State<RegistrationAppState>,
    subject: AuthenticatedSubject,
) -> Result<impl IntoResponse, RegistrationApiError> {
    let handler = state.list_handler();
    let registrations = handler
        .by_subject(ListRegistrationsQuery {
            subject_id: subject.subject_id,
        })
        .await?;

    let response = RegistrationListResponse {
        registrations: registrations
            .into_iter()
            .map(RegistrationResponse::from)
            .collect(),
    };
    Ok(Json(response))
}

/// GET /api/registrations/:key - Get one registration, freshly reconciled
pub async fn get_registration(
    State(state): State<RegistrationAppState>,
    subject: AuthenticatedSubject,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, RegistrationApiError> {
    let key = RegistrationKey::from_raw(key);
    let handler = state.get_status_handler();
    let registration = handler.handle(GetStatusQuery { key: key.clone() }).await?;

    // Do not reveal other subjects' registrations.
    if registration.subject_id != subject.subject_id {
        return Err(RegistrationError::not_found(key).into());
    }

    Ok(Json(RegistrationResponse::from(registration)))
}

/// GET /api/groups/:group_id - List a group's members, captain first
pub async fn get_group_members(
    State(state): State<RegistrationAppState>,
    subject: AuthenticatedSubject,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, RegistrationApiError> {
    let group_id: GroupId = group_id
        .parse()
        .map_err(|_| RegistrationError::validation("group_id", "not a valid group id"))?;

    let handler = state.list_handler();
    let members = handler.group_members(ListGroupQuery { group_id }).await?;

    // Group listings are visible to the subject that booked them.
    if !members.is_empty() && members[0].subject_id != subject.subject_id {
        return Err(RegistrationError::validation("group_id", "not a valid group id").into());
    }

    let response = GroupMembersResponse {
        group_id: group_id.to_string(),
        members: members.into_iter().map(RegistrationResponse::from).collect(),
    };
    Ok(Json(response))
}

/// API error type that converts registration errors to HTTP responses.
pub struct RegistrationApiError(RegistrationError);

impl From<RegistrationError> for RegistrationApiError {
    fn from(err: RegistrationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RegistrationApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            RegistrationError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            RegistrationError::UnknownTicket(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_TICKET"),
            RegistrationError::GroupSizeOutOfBounds { .. } => {
                (StatusCode::BAD_REQUEST, "GROUP_SIZE_OUT_OF_BOUNDS")
            }
            RegistrationError::AlreadyRegistered { .. } => {
                (StatusCode::CONFLICT, "ALREADY_REGISTERED")
            }
            RegistrationError::BookingInProgress { .. } => {
                (StatusCode::CONFLICT, "BOOKING_IN_PROGRESS")
            }
            RegistrationError::NotFound(_) => (StatusCode::NOT_FOUND, "REGISTRATION_NOT_FOUND"),
            RegistrationError::Gateway { .. } => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            RegistrationError::Store { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message());
        (status, Json(body)).into_response()
    }
}
