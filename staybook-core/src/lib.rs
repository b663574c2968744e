pub mod models;
pub mod repository;
pub mod memory;
pub mod occupancy;
pub mod eligibility;
pub mod reader;
pub mod allocator;
pub mod mutator;
pub mod service;

pub use eligibility::{IneligibleReason, TicketEligibilityChecker};
pub use occupancy::{RoomOccupancy, RoomOccupancyChecker};
pub use reader::BookingReader;
pub use allocator::BookingAllocator;
pub use mutator::{BookingMutator, RoomChange};
pub use service::BookingService;
pub use memory::{InMemoryStore, StoreSeed};

use repository::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Booking not permitted: {0}")]
    Conflict(String),
    #[error("Not eligible for a hotel room: {0}")]
    Ineligible(IneligibleReason),
    #[error("Storage failure: {0}")]
    Storage(#[from] RepoError),
}

pub type CoreResult<T> = Result<T, CoreError>;
