use std::sync::Arc;
use tracing::{info, warn};

use crate::allocator::rejected_write;
use crate::models::{Booking, BookingId, RoomId, UserId};
use crate::occupancy::RoomOccupancyChecker;
use crate::repository::{BookingRepository, WriteOutcome};
use crate::{CoreError, CoreResult};

/// A committed room change and the room the booking left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomChange {
    pub booking: Booking,
    pub from_room_id: RoomId,
}

/// Moves an existing booking to another room.
///
/// Ticket eligibility is not re-checked: a user holding a booking already passed it at creation.
#[derive(Clone)]
pub struct BookingMutator {
    occupancy: RoomOccupancyChecker,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingMutator {
    pub fn new(occupancy: RoomOccupancyChecker, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { occupancy, bookings }
    }

    pub async fn update_booking(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        new_room_id: RoomId,
    ) -> CoreResult<Booking> {
        Ok(self.change_room(user_id, booking_id, new_room_id).await?.booking)
    }

    pub async fn change_room(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        new_room_id: RoomId,
    ) -> CoreResult<RoomChange> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("booking {}", booking_id)))?;

        // Wrong owner and a move into the same room are reported identically
        if booking.user_id != user_id || booking.room_id == new_room_id {
            warn!(
                user_id,
                booking_id,
                owner_id = booking.user_id,
                current_room_id = booking.room_id,
                new_room_id,
                "Room change refused"
            );
            return Err(CoreError::Conflict("booking cannot be moved to this room".to_string()));
        }

        self.occupancy.ensure_vacancy(new_room_id).await?;

        match self.bookings.move_booking(booking_id, user_id, new_room_id).await? {
            WriteOutcome::Applied(updated) => {
                info!(
                    booking_id,
                    user_id,
                    from_room_id = booking.room_id,
                    to_room_id = new_room_id,
                    "Booking moved"
                );
                Ok(RoomChange { booking: updated, from_room_id: booking.room_id })
            }
            outcome => Err(rejected_write(outcome, new_room_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::fixtures::{eligible_user, room};
    use crate::memory::InMemoryStore;
    use crate::BookingService;

    async fn setup() -> (Arc<InMemoryStore>, BookingService, Booking) {
        let store = Arc::new(InMemoryStore::new());
        store.insert_room(room(1, 1)).await;
        store.insert_room(room(2, 1)).await;
        store.insert_room(room(3, 4)).await;
        eligible_user(&store, 1).await;
        eligible_user(&store, 2).await;

        let service = BookingService::from_store(store.clone());
        let booking = service.create_booking(1, 1).await.unwrap();
        (store, service, booking)
    }

    #[tokio::test]
    async fn test_move_to_empty_room() {
        let (store, service, booking) = setup().await;

        let updated = service.update_booking(1, booking.id, 2).await.unwrap();
        assert_eq!(updated.id, booking.id);
        assert_eq!(updated.user_id, 1);
        assert_eq!(updated.room_id, 2);
        assert!(updated.updated_at >= booking.updated_at);

        let found = service.get_booking(1).await.unwrap();
        assert_eq!(found.room.id, 2);
        assert_eq!(store.count_by_room(1).await.unwrap(), 0);
        assert_eq!(service.check_room_availability(1).await.unwrap().occupancy, 0);
    }

    #[tokio::test]
    async fn test_change_room_reports_origin() {
        let (_store, service, booking) = setup().await;

        let change = service.change_room(1, booking.id, 3).await.unwrap();
        assert_eq!(change.from_room_id, 1);
        assert_eq!(change.booking.room_id, 3);
    }

    #[tokio::test]
    async fn test_same_room_is_conflict_even_with_space() {
        let (_store, service, _) = setup().await;
        let booking = service.create_booking(2, 3).await.unwrap();

        let result = service.update_booking(2, booking.id, 3).await;
        assert!(matches!(result, Err(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_other_user_cannot_move_booking() {
        let (_store, service, booking) = setup().await;

        let result = service.update_booking(2, booking.id, 3).await;
        assert!(matches!(result, Err(CoreError::Conflict(_))));
        assert_eq!(service.get_booking(1).await.unwrap().room.id, 1);
    }

    #[tokio::test]
    async fn test_missing_booking_is_not_found() {
        let (_store, service, _) = setup().await;
        assert!(matches!(service.update_booking(1, 999, 2).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_target_room_full_or_missing() {
        let (_store, service, _) = setup().await;
        let other = service.create_booking(2, 2).await.unwrap();

        assert!(matches!(service.update_booking(2, other.id, 1).await, Err(CoreError::Conflict(_))));
        assert!(matches!(service.update_booking(2, other.id, 42).await, Err(CoreError::NotFound(_))));
        assert_eq!(service.get_booking(2).await.unwrap().room.id, 2);
    }
}
