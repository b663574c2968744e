use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use staybook_core::BookingService;

use crate::app_config::DatabaseConfig;
use crate::{StoreBookingRepository, StoreEnrollmentRepository, StoreRoomRepository, StoreTicketRepository};

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Wire a `BookingService` over the Postgres repositories sharing this pool.
    pub fn booking_service(&self) -> BookingService {
        BookingService::new(
            Arc::new(StoreRoomRepository::new(self.pool.clone())),
            Arc::new(StoreEnrollmentRepository::new(self.pool.clone())),
            Arc::new(StoreTicketRepository::new(self.pool.clone())),
            Arc::new(StoreBookingRepository::new(self.pool.clone())),
        )
    }
}
