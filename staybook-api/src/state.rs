use staybook_core::BookingService;
use staybook_shared::BookingEvent;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingService,
    pub events: broadcast::Sender<BookingEvent>,
    pub auth: AuthConfig,
}
