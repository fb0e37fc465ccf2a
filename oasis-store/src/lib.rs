pub mod app_config;
pub mod booking_repo;
pub mod cabin_repo;
pub mod database;
pub mod guest_repo;
pub mod redis_repo;

pub use booking_repo::PgBookingRepository;
pub use cabin_repo::PgCabinRepository;
pub use database::DbClient;
pub use guest_repo::PgGuestRepository;
pub use redis_repo::RedisClient;
