use std::sync::Arc;
use tracing::debug;

use crate::models::{Room, RoomId};
use crate::repository::{BookingRepository, RoomRepository};
use crate::{CoreError, CoreResult};

/// A room together with the number of bookings currently referencing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOccupancy {
    pub room: Room,
    pub occupancy: i64,
}

impl RoomOccupancy {
    pub fn is_full(&self) -> bool {
        self.occupancy >= i64::from(self.room.capacity)
    }

    pub fn vacancies(&self) -> i64 {
        (i64::from(self.room.capacity) - self.occupancy).max(0)
    }
}

#[derive(Clone)]
pub struct RoomOccupancyChecker {
    rooms: Arc<dyn RoomRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl RoomOccupancyChecker {
    pub fn new(rooms: Arc<dyn RoomRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { rooms, bookings }
    }

    /// Look up the room and count its bookings. Fails with `NotFound` when the room does not exist.
    pub async fn check_room_availability(&self, room_id: RoomId) -> CoreResult<RoomOccupancy> {
        let room = self
            .rooms
            .find_room(room_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("room {}", room_id)))?;

        let occupancy = self.bookings.count_by_room(room_id).await?;
        debug!(room_id, occupancy, capacity = room.capacity, "Checked room occupancy");

        Ok(RoomOccupancy { room, occupancy })
    }

    /// Like `check_room_availability`, but a full room is a `Conflict`.
    pub async fn ensure_vacancy(&self, room_id: RoomId) -> CoreResult<RoomOccupancy> {
        let occupancy = self.check_room_availability(room_id).await?;
        if occupancy.is_full() {
            return Err(CoreError::Conflict(format!("room {} is fully booked", room_id)));
        }
        Ok(occupancy)
    }
}
