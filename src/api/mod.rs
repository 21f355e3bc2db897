//! REST API layer: route handlers, DTOs, OpenAPI document, and router
//! composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "event-hub", description = "Event listing and booking API"),
    paths(
        handlers::event::create_event,
        handlers::event::list_events,
        handlers::booking::create_booking,
        handlers::booking::get_booking,
        handlers::booking::update_booking,
        handlers::booking::list_event_bookings,
        handlers::booking::lookup_booking,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::CreateEventRequest,
        dto::EventDto,
        dto::EventListResponse,
        dto::PaginationMeta,
        dto::CreateBookingRequest,
        dto::UpdateBookingRequest,
        dto::BookingDto,
        dto::BookingListResponse,
        dto::BookingLookupResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Events", description = "Featured events"),
        (name = "Bookings", description = "Event bookings"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
