//! Booking handlers: create, get, update, list per event, lookup by email.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    BookingDto, BookingListResponse, BookingLookupQuery, BookingLookupResponse,
    CreateBookingRequest, UpdateBookingRequest,
};
use crate::app_state::AppState;
use crate::domain::{BookingId, BookingPatch, Email, EventId, NewBooking};
use crate::error::{AppError, ErrorResponse};

/// `POST /bookings` — Book an event.
///
/// Field rules run before any database work; the event reference is
/// checked before the insert.
///
/// # Errors
///
/// Returns [`AppError`] on invalid fields, a missing event, or storage
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "Create a booking",
    description = "Validates the email and event reference, then stores the booking.",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingDto),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 422, description = "Referenced event does not exist", body = ErrorResponse),
        (status = 503, description = "Database unavailable", body = ErrorResponse),
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let draft = NewBooking::parse(req.event_id.as_ref(), req.email.as_ref())?;
    let booking = state.bookings.create_booking(draft).await?;
    Ok((StatusCode::CREATED, Json(BookingDto::from(booking))))
}

/// `GET /bookings/{id}` — Get a booking.
///
/// # Errors
///
/// Returns [`AppError::BookingNotFound`] if the booking does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Get a booking",
    params(
        ("id" = uuid::Uuid, Path, description = "Booking UUID"),
    ),
    responses(
        (status = 200, description = "Booking", body = BookingDto),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.bookings.get_booking(BookingId::from_uuid(id)).await?;
    Ok(Json(BookingDto::from(booking)))
}

/// `PATCH /bookings/{id}` — Change a booking's email or event.
///
/// # Errors
///
/// Returns [`AppError`] on invalid fields, an unknown booking, a missing
/// new event, or storage failure.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Update a booking",
    description = "Only fields present in the body change. The event reference is re-checked only when it changes.",
    params(
        ("id" = uuid::Uuid, Path, description = "Booking UUID"),
    ),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Updated booking", body = BookingDto),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Booking changed concurrently", body = ErrorResponse),
        (status = 422, description = "Referenced event does not exist", body = ErrorResponse),
    )
)]
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let patch = BookingPatch::parse(req.event_id.as_ref(), req.email.as_ref())?;
    if patch.is_empty() {
        return Err(AppError::InvalidRequest(
            "at least one of eventId or email is required".to_string(),
        ));
    }
    let booking = state
        .bookings
        .update_booking(BookingId::from_uuid(id), &patch)
        .await?;
    Ok(Json(BookingDto::from(booking)))
}

/// `GET /events/{id}/bookings` — List bookings for an event.
///
/// # Errors
///
/// Returns [`AppError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/bookings",
    tag = "Bookings",
    summary = "List bookings for an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Bookings, newest first", body = BookingListResponse),
    )
)]
pub async fn list_event_bookings(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state
        .bookings
        .bookings_for_event(EventId::from_uuid(id))
        .await?;
    Ok(Json(BookingListResponse {
        data: bookings.into_iter().map(BookingDto::from).collect(),
    }))
}

/// `GET /events/{id}/bookings/lookup?email=` — Has this email booked the event?
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the email is malformed.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/bookings/lookup",
    tag = "Bookings",
    summary = "Look up a booking by email",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        BookingLookupQuery,
    ),
    responses(
        (status = 200, description = "Lookup result", body = BookingLookupResponse),
        (status = 400, description = "Invalid email", body = ErrorResponse),
    )
)]
pub async fn lookup_booking(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<BookingLookupQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = Email::parse(&query.email)?;
    let booking = state
        .bookings
        .find_booking(EventId::from_uuid(id), &email)
        .await?;
    Ok(Json(BookingLookupResponse {
        booked: booking.is_some(),
        booking: booking.map(BookingDto::from),
    }))
}

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", get(get_booking).patch(update_booking))
        .route("/events/{id}/bookings", get(list_event_bookings))
        .route("/events/{id}/bookings/lookup", get(lookup_booking))
}
