//! Request handlers for the booking API.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use slotwise_service::{availability, create_booking, CreateOutcome, ServiceConfig};

use crate::error::{bad_request, ApiError};
use crate::payload::{
    AvailabilityQuery, AvailabilityResponse, BookingEnvelope, ConflictEnvelope,
    CreateBookingRequest,
};

/// State shared across handlers. The pool is the only process-wide
/// resource; per-request cancellation tokens are children of the shutdown
/// token so in-flight transactions roll back on shutdown.
pub struct AppState {
    pub pool: PgPool,
    pub config: ServiceConfig,
    pub shutdown: CancellationToken,
}

/// POST /bookings — create a single or recurring booking.
///
/// 201 with the created booking, 409 with a structured conflict report,
/// 400 on validation or rule-parse failure, 404 for an unknown resource.
pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|rejection| bad_request(rejection.body_text()))?;
    let cancel = state.shutdown.child_token();

    let outcome = create_booking(
        &state.pool,
        &state.config,
        body.into_service_request(),
        &cancel,
    )
    .await?;

    Ok(match outcome {
        CreateOutcome::Created(record) => (
            StatusCode::CREATED,
            Json(BookingEnvelope::from(record)),
        )
            .into_response(),
        CreateOutcome::Conflict(report) => (
            StatusCode::CONFLICT,
            Json(ConflictEnvelope::from(report)),
        )
            .into_response(),
    })
}

/// GET /availability — enumerate free slots on a resource.
pub async fn availability_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(|rejection| bad_request(rejection.body_text()))?;
    let cancel = state.shutdown.child_token();

    let report = availability(
        &state.pool,
        params.resource_id,
        params.from,
        params.to,
        params.slot,
        &cancel,
    )
    .await?;

    Ok(Json(AvailabilityResponse::from(report)).into_response())
}
