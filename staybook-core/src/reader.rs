use std::sync::Arc;

use crate::models::{BookingWithRoom, UserId};
use crate::repository::BookingRepository;
use crate::{CoreError, CoreResult};

#[derive(Clone)]
pub struct BookingReader {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingReader {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    /// The user's booking with its room, or `NotFound` if they have none.
    pub async fn get_booking(&self, user_id: UserId) -> CoreResult<BookingWithRoom> {
        self.find_booking(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("booking for user {}", user_id)))
    }

    pub async fn find_booking(&self, user_id: UserId) -> CoreResult<Option<BookingWithRoom>> {
        Ok(self.bookings.find_by_user(user_id).await?)
    }
}
