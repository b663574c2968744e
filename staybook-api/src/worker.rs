use staybook_shared::BookingEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

/// Log every booking event as structured JSON until all senders are dropped.
///
/// Returns the number of events written.
pub async fn run_audit_log(mut rx: broadcast::Receiver<BookingEvent>) -> u64 {
    info!("Booking audit worker started");
    let mut written = 0;

    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(payload) => {
                    info!(
                        topic = event.topic(),
                        booking_id = event.booking_id(),
                        payload = %payload,
                        "Booking event"
                    );
                    written += 1;
                }
                Err(e) => error!("Failed to serialize booking event: {}", e),
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("Audit worker lagged, {} booking events skipped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!("Booking audit worker stopped after {} events", written);
    written
}
