use std::sync::Arc;
use tracing::{info, warn};

use crate::eligibility::TicketEligibilityChecker;
use crate::models::{Booking, RoomId, UserId};
use crate::occupancy::RoomOccupancyChecker;
use crate::reader::BookingReader;
use crate::repository::{BookingRepository, WriteOutcome};
use crate::{CoreError, CoreResult};

/// Creates bookings for eligible users in rooms with spare capacity.
#[derive(Clone)]
pub struct BookingAllocator {
    occupancy: RoomOccupancyChecker,
    eligibility: TicketEligibilityChecker,
    reader: BookingReader,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingAllocator {
    pub fn new(
        occupancy: RoomOccupancyChecker,
        eligibility: TicketEligibilityChecker,
        reader: BookingReader,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self { occupancy, eligibility, reader, bookings }
    }

    pub async fn create_booking(&self, user_id: UserId, room_id: RoomId) -> CoreResult<Booking> {
        // 1. Room must exist and have a free slot
        self.occupancy.ensure_vacancy(room_id).await?;

        // 2. Ticket must allow a hotel room; every reason surfaces as the same Conflict
        let ticket = self.eligibility.check_eligibility(user_id).await.map_err(|e| match e {
            CoreError::Ineligible(reason) => {
                warn!(user_id, %reason, "Booking refused: ticket not eligible");
                CoreError::Conflict("ticket does not allow a hotel booking".to_string())
            }
            other => other,
        })?;

        // 3. One booking per user
        if let Some(existing) = self.reader.find_booking(user_id).await? {
            warn!(user_id, booking_id = existing.booking.id, "Booking refused: user already has one");
            return Err(CoreError::Conflict("user already has a booking".to_string()));
        }

        // 4. Guarded insert re-checks capacity and uniqueness atomically
        match self.bookings.create_booking(user_id, room_id).await? {
            WriteOutcome::Applied(booking) => {
                info!(booking_id = booking.id, user_id, room_id, ticket_id = ticket.id, "Booking created");
                Ok(booking)
            }
            outcome => Err(rejected_write(outcome, room_id)),
        }
    }
}

/// Map a guarded write that lost a race to the outward error kinds.
pub(crate) fn rejected_write(outcome: WriteOutcome, room_id: RoomId) -> CoreError {
    match outcome {
        WriteOutcome::RoomMissing => CoreError::NotFound(format!("room {}", room_id)),
        WriteOutcome::RoomFull => CoreError::Conflict(format!("room {} is fully booked", room_id)),
        WriteOutcome::DuplicateBooking => CoreError::Conflict("user already has a booking".to_string()),
        WriteOutcome::BookingChanged | WriteOutcome::Applied(_) => {
            CoreError::Conflict("booking changed concurrently".to_string())
        }
    }
}
