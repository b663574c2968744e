use async_trait::async_trait;
use sqlx::PgPool;
use staybook_core::models::{Room, RoomId};
use staybook_core::repository::{RepoResult, RoomRepository};

pub struct StoreRoomRepository {
    pool: PgPool,
}

impl StoreRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: i32,
    name: String,
    capacity: i32,
    hotel_id: i32,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            capacity: row.capacity,
            hotel_id: row.hotel_id,
        }
    }
}

#[async_trait]
impl RoomRepository for StoreRoomRepository {
    async fn find_room(&self, room_id: RoomId) -> RepoResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT id, name, capacity, hotel_id FROM rooms WHERE id = $1",
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Room::from))
    }
}
