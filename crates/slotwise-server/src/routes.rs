//! Router assembly.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{availability_handler, create_booking_handler, AppState};

/// Build the booking API router.
///
/// Routes:
/// - POST /bookings     - create a single or recurring booking
/// - GET  /availability - free slots for a resource and window
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/bookings", post(create_booking_handler))
        .route("/availability", get(availability_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
