use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::models::{
    Booking, BookingId, BookingWithRoom, Enrollment, EnrollmentId, Room, RoomId, Ticket, UserId,
};
use crate::repository::{
    BookingRepository, EnrollmentRepository, RepoResult, RoomRepository, TicketRepository,
    WriteOutcome,
};

#[derive(Default)]
struct StoreState {
    rooms: HashMap<RoomId, Room>,
    enrollments: HashMap<UserId, Enrollment>,
    tickets: HashMap<EnrollmentId, Ticket>,
    bookings: BTreeMap<BookingId, Booking>,
    next_booking_id: BookingId,
}

impl StoreState {
    fn occupancy(&self, room_id: RoomId) -> i64 {
        self.bookings.values().filter(|b| b.room_id == room_id).count() as i64
    }
}

/// Read-only records to preload into an `InMemoryStore`.
#[derive(Debug, Default, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

/// In-memory persistence for all booking-related records.
///
/// Every guarded write runs under a single write lock, which makes the capacity and
/// one-booking-per-user checks atomic with the insert/update.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: StoreSeed) -> Self {
        let state = StoreState {
            rooms: seed.rooms.into_iter().map(|r| (r.id, r)).collect(),
            enrollments: seed.enrollments.into_iter().map(|e| (e.user_id, e)).collect(),
            tickets: seed.tickets.into_iter().map(|t| (t.enrollment_id, t)).collect(),
            ..StoreState::default()
        };
        Self { state: RwLock::new(state) }
    }

    pub async fn insert_room(&self, room: Room) {
        self.state.write().await.rooms.insert(room.id, room);
    }

    pub async fn insert_enrollment(&self, enrollment: Enrollment) {
        self.state.write().await.enrollments.insert(enrollment.user_id, enrollment);
    }

    pub async fn insert_ticket(&self, ticket: Ticket) {
        self.state.write().await.tickets.insert(ticket.enrollment_id, ticket);
    }

    pub async fn booking_count(&self) -> usize {
        self.state.read().await.bookings.len()
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn find_room(&self, room_id: RoomId) -> RepoResult<Option<Room>> {
        Ok(self.state.read().await.rooms.get(&room_id).cloned())
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn find_with_address_by_user(&self, user_id: UserId) -> RepoResult<Option<Enrollment>> {
        Ok(self.state.read().await.enrollments.get(&user_id).cloned())
    }
}

#[async_trait]
impl TicketRepository for InMemoryStore {
    async fn find_by_enrollment(&self, enrollment_id: EnrollmentId) -> RepoResult<Option<Ticket>> {
        Ok(self.state.read().await.tickets.get(&enrollment_id).cloned())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn find_by_id(&self, booking_id: BookingId) -> RepoResult<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&booking_id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Option<BookingWithRoom>> {
        let state = self.state.read().await;
        let found = state
            .bookings
            .values()
            .find(|b| b.user_id == user_id)
            .and_then(|booking| {
                state.rooms.get(&booking.room_id).map(|room| BookingWithRoom {
                    booking: booking.clone(),
                    room: room.clone(),
                })
            });
        Ok(found)
    }

    async fn count_by_room(&self, room_id: RoomId) -> RepoResult<i64> {
        Ok(self.state.read().await.occupancy(room_id))
    }

    async fn create_booking(&self, user_id: UserId, room_id: RoomId) -> RepoResult<WriteOutcome> {
        let mut state = self.state.write().await;

        let capacity = match state.rooms.get(&room_id) {
            Some(room) => i64::from(room.capacity),
            None => return Ok(WriteOutcome::RoomMissing),
        };
        if state.bookings.values().any(|b| b.user_id == user_id) {
            return Ok(WriteOutcome::DuplicateBooking);
        }
        if state.occupancy(room_id) >= capacity {
            return Ok(WriteOutcome::RoomFull);
        }

        state.next_booking_id += 1;
        let now = Utc::now();
        let booking = Booking {
            id: state.next_booking_id,
            user_id,
            room_id,
            created_at: now,
            updated_at: now,
        };
        state.bookings.insert(booking.id, booking.clone());

        Ok(WriteOutcome::Applied(booking))
    }

    async fn move_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        room_id: RoomId,
    ) -> RepoResult<WriteOutcome> {
        let mut state = self.state.write().await;

        match state.bookings.get(&booking_id) {
            Some(b) if b.user_id == user_id && b.room_id != room_id => {}
            _ => return Ok(WriteOutcome::BookingChanged),
        }
        let capacity = match state.rooms.get(&room_id) {
            Some(room) => i64::from(room.capacity),
            None => return Ok(WriteOutcome::RoomMissing),
        };
        if state.occupancy(room_id) >= capacity {
            return Ok(WriteOutcome::RoomFull);
        }

        let Some(booking) = state.bookings.get_mut(&booking_id) else {
            return Ok(WriteOutcome::BookingChanged);
        };
        booking.room_id = room_id;
        booking.updated_at = Utc::now();

        Ok(WriteOutcome::Applied(booking.clone()))
    }
}
