use async_trait::async_trait;

use crate::models::{
    Booking, BookingChanges, BookingId, Cabin, CabinId, Guest, GuestId, NewBooking, NewGuest,
    ProfileUpdate, Session,
};

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Answers "who is calling" for the current request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session(&self) -> Option<Session>;
}

/// Repository trait for cabin data access
#[async_trait]
pub trait CabinRepository: Send + Sync {
    /// All cabins, ordered by name.
    async fn list_cabins(&self) -> StoreResult<Vec<Cabin>>;

    async fn get_cabin(&self, id: CabinId) -> StoreResult<Option<Cabin>>;
}

/// Repository trait for guest data access
#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Guest>>;

    async fn get_guest(&self, id: GuestId) -> StoreResult<Option<Guest>>;

    async fn create_guest(&self, guest: &NewGuest) -> StoreResult<Guest>;

    async fn update_profile(&self, id: GuestId, update: &ProfileUpdate) -> StoreResult<()>;
}

/// Repository trait for booking data access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Every booking held by `guest_id`, latest start date first.
    async fn list_for_guest(&self, guest_id: GuestId) -> StoreResult<Vec<Booking>>;

    async fn create_booking(&self, booking: &NewBooking) -> StoreResult<Booking>;

    async fn delete_booking(&self, id: BookingId) -> StoreResult<()>;

    /// Fails if no row with `id` exists.
    async fn update_booking(&self, id: BookingId, changes: &BookingChanges) -> StoreResult<Booking>;
}

/// Rendered-page cache keyed by request path.
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, path: &str) -> Option<String>;

    async fn put(&self, path: &str, body: &str);

    /// Marks the entry for `path` stale. Backend failures are logged, not returned.
    async fn invalidate(&self, path: &str);
}

/// Session tokens that were signed out before they expired.
#[async_trait]
pub trait SessionRevocations: Send + Sync {
    async fn revoke(&self, token_id: &str, ttl_seconds: u64) -> StoreResult<()>;

    async fn is_revoked(&self, token_id: &str) -> StoreResult<bool>;
}
