pub mod actions;
pub mod cabins;
pub mod memory;
pub mod models;
pub mod paths;
pub mod repository;

pub use actions::{ActionOutcome, BookingActions};
pub use cabins::CapacityFilter;
pub use models::{Booking, BookingStatus, Cabin, Guest, Session, SessionUser};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    AuthorizationError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    StoreError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
