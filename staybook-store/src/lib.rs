pub mod app_config;
pub mod database;
pub mod room_repo;
pub mod enrollment_repo;
pub mod ticket_repo;
pub mod booking_repo;

pub use database::DbClient;
pub use room_repo::StoreRoomRepository;
pub use enrollment_repo::StoreEnrollmentRepository;
pub use ticket_repo::StoreTicketRepository;
pub use booking_repo::StoreBookingRepository;
