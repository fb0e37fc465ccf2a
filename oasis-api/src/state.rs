use oasis_core::repository::{
    BookingRepository, CabinRepository, GuestRepository, PageCache, SessionRevocations,
};
use oasis_core::BookingActions;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Key the identity provider signs ID tokens with.
    pub provider_secret: String,
    /// Session lifetime in seconds.
    pub expiration: u64,
    /// Only send the session cookie over HTTPS.
    pub secure_cookie: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub cabins: Arc<dyn CabinRepository>,
    pub pages: Arc<dyn PageCache>,
    pub revocations: Arc<dyn SessionRevocations>,
    pub actions: BookingActions,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(
        cabins: Arc<dyn CabinRepository>,
        guests: Arc<dyn GuestRepository>,
        bookings: Arc<dyn BookingRepository>,
        pages: Arc<dyn PageCache>,
        revocations: Arc<dyn SessionRevocations>,
        auth: AuthConfig,
    ) -> Self {
        let actions = BookingActions::new(guests, bookings, pages.clone());
        Self {
            cabins,
            pages,
            revocations,
            actions,
            auth,
        }
    }
}
