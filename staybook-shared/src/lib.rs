pub mod pii;
pub mod models;

pub use models::events::{BookingEvent, BookingCreatedEvent, BookingRoomChangedEvent};
pub use pii::Masked;
