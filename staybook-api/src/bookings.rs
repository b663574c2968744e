use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use staybook_core::models::{BookingId, Room, RoomId};
use staybook_shared::BookingEvent;
use tracing::{debug, info};

use crate::error::AppError;
use crate::middleware::{require_user, CurrentUser};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub room_id: RoomId,
}

impl BookingRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.room_id <= 0 {
            return Err(AppError::ValidationError("roomId must be a positive integer".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingIdResponse {
    pub booking_id: BookingId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: BookingId,
    pub room: Room,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/booking", get(get_booking).post(create_booking))
        .route("/booking/{booking_id}", put(update_booking))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

/// GET /booking
/// The caller's booking with its room
async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<BookingResponse>, AppError> {
    let found = state.bookings.get_booking(user.user_id).await?;

    Ok(Json(BookingResponse {
        id: found.booking.id,
        room: found.room,
    }))
}

/// POST /booking
/// Reserve a room for the caller
async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<BookingRequest>,
) -> Result<Json<BookingIdResponse>, AppError> {
    req.validate()?;

    let booking = state.bookings.create_booking(user.user_id, req.room_id).await?;

    publish(&state, BookingEvent::created(booking.id, booking.user_id, booking.room_id));
    info!("Booking {} confirmed for user {}", booking.id, booking.user_id);

    Ok(Json(BookingIdResponse { booking_id: booking.id }))
}

/// PUT /booking/{booking_id}
/// Move the caller's booking to another room
async fn update_booking(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(booking_id): Path<BookingId>,
    Json(req): Json<BookingRequest>,
) -> Result<Json<BookingIdResponse>, AppError> {
    req.validate()?;

    let change = state.bookings.change_room(user.user_id, booking_id, req.room_id).await?;
    let booking = change.booking;

    publish(
        &state,
        BookingEvent::room_changed(booking.id, booking.user_id, change.from_room_id, booking.room_id),
    );
    info!("Booking {} moved from room {} to room {}", booking.id, change.from_room_id, booking.room_id);

    Ok(Json(BookingIdResponse { booking_id: booking.id }))
}

fn publish(state: &AppState, event: BookingEvent) {
    // A send only fails when nobody is listening
    if state.events.send(event).is_err() {
        debug!("No subscribers for booking events");
    }
}
