use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use staybook_core::models::{Booking, BookingId, BookingWithRoom, Room, RoomId, UserId};
use staybook_core::repository::{BookingRepository, RepoResult, WriteOutcome};

/// Postgres booking persistence.
///
/// Writes lock the target room row (`FOR UPDATE`) before counting its bookings, so concurrent
/// writers to the same room are serialized. `bookings.user_id` is UNIQUE; a violation is reported
/// as `WriteOutcome::DuplicateBooking`.
pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, room_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i32,
    user_id: i32,
    room_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            room_id: row.room_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingWithRoomRow {
    id: i32,
    user_id: i32,
    room_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    room_name: String,
    room_capacity: i32,
    room_hotel_id: i32,
}

impl From<BookingWithRoomRow> for BookingWithRoom {
    fn from(row: BookingWithRoomRow) -> Self {
        BookingWithRoom {
            booking: Booking {
                id: row.id,
                user_id: row.user_id,
                room_id: row.room_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            room: Room {
                id: row.room_id,
                name: row.room_name,
                capacity: row.room_capacity,
                hotel_id: row.room_hotel_id,
            },
        }
    }
}

/// Lock the room row and report whether it has a free slot.
async fn lock_room_vacancy(
    tx: &mut Transaction<'_, Postgres>,
    room_id: RoomId,
) -> Result<Option<WriteOutcome>, sqlx::Error> {
    let capacity: Option<(i32,)> = sqlx::query_as("SELECT capacity FROM rooms WHERE id = $1 FOR UPDATE")
        .bind(room_id)
        .fetch_optional(&mut **tx)
        .await?;

    let Some((capacity,)) = capacity else {
        return Ok(Some(WriteOutcome::RoomMissing));
    };

    let (occupancy,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
        .bind(room_id)
        .fetch_one(&mut **tx)
        .await?;

    debug!(room_id, occupancy, capacity, "Locked room for booking write");

    if occupancy >= i64::from(capacity) {
        return Ok(Some(WriteOutcome::RoomFull));
    }
    Ok(None)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn find_by_id(&self, booking_id: BookingId) -> RepoResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Option<BookingWithRoom>> {
        let row = sqlx::query_as::<_, BookingWithRoomRow>(
            r#"
            SELECT b.id, b.user_id, b.room_id, b.created_at, b.updated_at,
                   r.name AS room_name, r.capacity AS room_capacity, r.hotel_id AS room_hotel_id
            FROM bookings b
            JOIN rooms r ON r.id = b.room_id
            WHERE b.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BookingWithRoom::from))
    }

    async fn count_by_room(&self, room_id: RoomId) -> RepoResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_booking(&self, user_id: UserId, room_id: RoomId) -> RepoResult<WriteOutcome> {
        let mut tx = self.pool.begin().await?;

        // Early returns drop `tx`, which rolls it back
        if let Some(rejected) = lock_room_vacancy(&mut tx, room_id).await? {
            return Ok(rejected);
        }

        let inserted = sqlx::query_as::<_, BookingRow>(&format!(
            "INSERT INTO bookings (user_id, room_id) VALUES ($1, $2) RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .bind(room_id)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => return Ok(WriteOutcome::DuplicateBooking),
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        Ok(WriteOutcome::Applied(row.into()))
    }

    async fn move_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        room_id: RoomId,
    ) -> RepoResult<WriteOutcome> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?;

        match current {
            Some(row) if row.user_id == user_id && row.room_id != room_id => {}
            _ => return Ok(WriteOutcome::BookingChanged),
        }

        if let Some(rejected) = lock_room_vacancy(&mut tx, room_id).await? {
            return Ok(rejected);
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET room_id = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(room_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WriteOutcome::Applied(row.into()))
    }
}
