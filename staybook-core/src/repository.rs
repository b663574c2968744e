use async_trait::async_trait;
use crate::models::{
    Booking, BookingId, BookingWithRoom, Enrollment, EnrollmentId, Room, RoomId, Ticket, UserId,
};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;
pub type RepoResult<T> = Result<T, RepoError>;

/// Result of a guarded booking write.
///
/// Guarded writes re-check their preconditions atomically with the write itself, so a request that
/// passed the engine's earlier checks can still lose a race and get a rejection here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied(Booking),
    RoomMissing,
    RoomFull,
    /// The user already holds a booking.
    DuplicateBooking,
    /// The booking vanished, changed owner, or already sits in the target room.
    BookingChanged,
}

/// Read access to the hotel room catalog
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_room(&self, room_id: RoomId) -> RepoResult<Option<Room>>;
}

/// Read access to event enrollments
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Fetch the user's enrollment together with its address, if any.
    async fn find_with_address_by_user(&self, user_id: UserId) -> RepoResult<Option<Enrollment>>;
}

/// Read access to tickets and their types
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_by_enrollment(&self, enrollment_id: EnrollmentId) -> RepoResult<Option<Ticket>>;
}

/// Booking persistence
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, booking_id: BookingId) -> RepoResult<Option<Booking>>;

    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Option<BookingWithRoom>>;

    async fn count_by_room(&self, room_id: RoomId) -> RepoResult<i64>;

    /// Insert a booking unless the room is missing or full, or the user already has one.
    async fn create_booking(&self, user_id: UserId, room_id: RoomId) -> RepoResult<WriteOutcome>;

    /// Move a booking owned by `user_id` into `room_id` unless that room is missing or full.
    async fn move_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        room_id: RoomId,
    ) -> RepoResult<WriteOutcome>;
}
