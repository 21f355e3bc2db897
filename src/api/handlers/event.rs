//! Event handlers: create and list.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateEventRequest, EventDto, EventListResponse, PaginationParams};
use crate::app_state::AppState;
use crate::domain::NewEvent;
use crate::error::{AppError, ErrorResponse};

/// `POST /events` — Create an event.
///
/// # Errors
///
/// Returns [`AppError`] on invalid fields or storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Invalid field", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let draft = NewEvent::parse(&req.title, &req.location, req.starts_at)?;
    let event = state.bookings.create_event(draft).await?;
    Ok((StatusCode::CREATED, Json(EventDto::from(event))))
}

/// `GET /events` — List featured events, soonest first.
///
/// # Errors
///
/// Returns [`AppError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let params = params.clamped();
    let page = state
        .bookings
        .list_events(params.per_page, params.offset())
        .await?;

    Ok(Json(EventListResponse {
        data: page.events.into_iter().map(EventDto::from).collect(),
        pagination: params.meta(page.total),
    }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", get(list_events).post(create_event))
}
