use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BookingCreatedEvent {
    pub event_id: Uuid,
    pub booking_id: i32,
    pub user_id: i32,
    pub room_id: i32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BookingRoomChangedEvent {
    pub event_id: Uuid,
    pub booking_id: i32,
    pub user_id: i32,
    pub from_room_id: i32,
    pub to_room_id: i32,
    pub occurred_at: DateTime<Utc>,
}

/// State changes published after a booking write has been committed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEvent {
    BookingCreated(BookingCreatedEvent),
    BookingRoomChanged(BookingRoomChangedEvent),
}

impl BookingEvent {
    pub fn created(booking_id: i32, user_id: i32, room_id: i32) -> Self {
        Self::BookingCreated(BookingCreatedEvent {
            event_id: Uuid::new_v4(),
            booking_id,
            user_id,
            room_id,
            occurred_at: Utc::now(),
        })
    }

    pub fn room_changed(booking_id: i32, user_id: i32, from_room_id: i32, to_room_id: i32) -> Self {
        Self::BookingRoomChanged(BookingRoomChangedEvent {
            event_id: Uuid::new_v4(),
            booking_id,
            user_id,
            from_room_id,
            to_room_id,
            occurred_at: Utc::now(),
        })
    }

    pub fn booking_id(&self) -> i32 {
        match self {
            Self::BookingCreated(e) => e.booking_id,
            Self::BookingRoomChanged(e) => e.booking_id,
        }
    }

    /// Topic-style name used as the log target key.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::BookingCreated(_) => "booking.created",
            Self::BookingRoomChanged(_) => "booking.room_changed",
        }
    }
}
