use std::sync::Arc;

use crate::allocator::BookingAllocator;
use crate::eligibility::TicketEligibilityChecker;
use crate::models::{Booking, BookingId, BookingWithRoom, RoomId, Ticket, UserId};
use crate::mutator::{BookingMutator, RoomChange};
use crate::occupancy::{RoomOccupancy, RoomOccupancyChecker};
use crate::reader::BookingReader;
use crate::repository::{BookingRepository, EnrollmentRepository, RoomRepository, TicketRepository};
use crate::CoreResult;

/// Entry point used by the HTTP layer; wires the checkers, allocator, mutator and reader
/// over one set of repositories.
#[derive(Clone)]
pub struct BookingService {
    occupancy: RoomOccupancyChecker,
    eligibility: TicketEligibilityChecker,
    reader: BookingReader,
    allocator: BookingAllocator,
    mutator: BookingMutator,
}

impl BookingService {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        tickets: Arc<dyn TicketRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        let occupancy = RoomOccupancyChecker::new(rooms, bookings.clone());
        let eligibility = TicketEligibilityChecker::new(enrollments, tickets);
        let reader = BookingReader::new(bookings.clone());
        let allocator = BookingAllocator::new(
            occupancy.clone(),
            eligibility.clone(),
            reader.clone(),
            bookings.clone(),
        );
        let mutator = BookingMutator::new(occupancy.clone(), bookings);

        Self { occupancy, eligibility, reader, allocator, mutator }
    }

    /// Build from a single store that serves every repository.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: RoomRepository + EnrollmentRepository + TicketRepository + BookingRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store.clone(), store)
    }

    pub async fn get_booking(&self, user_id: UserId) -> CoreResult<BookingWithRoom> {
        self.reader.get_booking(user_id).await
    }

    pub async fn create_booking(&self, user_id: UserId, room_id: RoomId) -> CoreResult<Booking> {
        self.allocator.create_booking(user_id, room_id).await
    }

    pub async fn update_booking(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        new_room_id: RoomId,
    ) -> CoreResult<Booking> {
        self.mutator.update_booking(user_id, booking_id, new_room_id).await
    }

    /// Same as `update_booking`, also reporting the room the booking moved out of.
    pub async fn change_room(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        new_room_id: RoomId,
    ) -> CoreResult<RoomChange> {
        self.mutator.change_room(user_id, booking_id, new_room_id).await
    }

    pub async fn check_room_availability(&self, room_id: RoomId) -> CoreResult<RoomOccupancy> {
        self.occupancy.check_room_availability(room_id).await
    }

    pub async fn check_eligibility(&self, user_id: UserId) -> CoreResult<Ticket> {
        self.eligibility.check_eligibility(user_id).await
    }
}
