//! In-process implementations of the store, session and cache traits.
//!
//! Backs the unit and HTTP test suites.

use async_trait::async_trait;
use chrono::Utc;
use oasis_shared::Masked;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::models::{
    Booking, BookingChanges, BookingId, Cabin, CabinId, Guest, GuestId, NewBooking, NewGuest,
    ProfileUpdate, Session, SessionUser,
};
use crate::repository::{
    BookingRepository, CabinRepository, GuestRepository, PageCache, SessionProvider,
    SessionRevocations, StoreResult,
};

// ============================================================================
// Store
// ============================================================================

/// Cabins, guests and bookings held in memory.
///
/// Every trait call bumps [`InMemoryStore::calls`]; the `seed_*` helpers do not.
/// `fail_writes(true)` makes every insert, update and delete return an error.
pub struct InMemoryStore {
    cabins: Mutex<Vec<Cabin>>,
    guests: Mutex<Vec<Guest>>,
    bookings: Mutex<Vec<Booking>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            cabins: Mutex::new(Vec::new()),
            guests: Mutex::new(Vec::new()),
            bookings: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn with_cabins(cabins: Vec<Cabin>) -> Self {
        Self {
            cabins: Mutex::new(cabins),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn seed_guest(&self, email: &str, full_name: &str) -> Guest {
        let guest = self.build_guest(&NewGuest {
            full_name: full_name.to_string(),
            email: email.to_string(),
        });
        self.guests.lock().await.push(guest.clone());
        guest
    }

    pub async fn seed_booking(&self, booking: NewBooking) -> Booking {
        let booking = self.build_booking(&booking);
        self.bookings.lock().await.push(booking.clone());
        booking
    }

    pub async fn guest(&self, id: GuestId) -> Option<Guest> {
        self.guests.lock().await.iter().find(|g| g.id == id).cloned()
    }

    pub async fn bookings_snapshot(&self) -> Vec<Booking> {
        self.bookings.lock().await.clone()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_write(&self) -> StoreResult<()> {
        self.record_call();
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err("injected store failure".into());
        }
        Ok(())
    }

    fn build_guest(&self, guest: &NewGuest) -> Guest {
        Guest {
            id: self.next_id(),
            full_name: guest.full_name.clone(),
            email: guest.email.clone(),
            national_id: None,
            nationality: None,
            country_flag: None,
            created_at: Utc::now(),
        }
    }

    fn build_booking(&self, booking: &NewBooking) -> Booking {
        Booking {
            id: self.next_id(),
            created_at: Utc::now(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            num_nights: booking.num_nights,
            num_guests: booking.num_guests,
            cabin_price: booking.cabin_price,
            extras_price: booking.extras_price,
            total_price: booking.total_price,
            status: booking.status,
            has_breakfast: booking.has_breakfast,
            is_paid: booking.is_paid,
            observations: booking.observations.clone(),
            cabin_id: booking.cabin_id,
            guest_id: booking.guest_id,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CabinRepository for InMemoryStore {
    async fn list_cabins(&self) -> StoreResult<Vec<Cabin>> {
        self.record_call();
        let mut cabins = self.cabins.lock().await.clone();
        cabins.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cabins)
    }

    async fn get_cabin(&self, id: CabinId) -> StoreResult<Option<Cabin>> {
        self.record_call();
        Ok(self.cabins.lock().await.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl GuestRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Guest>> {
        self.record_call();
        Ok(self.guests.lock().await.iter().find(|g| g.email == email).cloned())
    }

    async fn get_guest(&self, id: GuestId) -> StoreResult<Option<Guest>> {
        self.record_call();
        Ok(self.guest(id).await)
    }

    async fn create_guest(&self, guest: &NewGuest) -> StoreResult<Guest> {
        self.check_write()?;
        let guest = self.build_guest(guest);
        self.guests.lock().await.push(guest.clone());
        Ok(guest)
    }

    async fn update_profile(&self, id: GuestId, update: &ProfileUpdate) -> StoreResult<()> {
        self.check_write()?;
        let mut guests = self.guests.lock().await;
        let guest = guests.iter_mut().find(|g| g.id == id).ok_or("guest not found")?;

        guest.nationality = Some(update.nationality.clone());
        guest.national_id = Some(update.national_id.clone());
        if let Some(flag) = &update.country_flag {
            guest.country_flag = Some(flag.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn list_for_guest(&self, guest_id: GuestId) -> StoreResult<Vec<Booking>> {
        self.record_call();
        let mut bookings: Vec<Booking> = self
            .bookings
            .lock()
            .await
            .iter()
            .filter(|b| b.guest_id == guest_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(bookings)
    }

    async fn create_booking(&self, booking: &NewBooking) -> StoreResult<Booking> {
        self.check_write()?;
        let booking = self.build_booking(booking);
        self.bookings.lock().await.push(booking.clone());
        Ok(booking)
    }

    async fn delete_booking(&self, id: BookingId) -> StoreResult<()> {
        self.check_write()?;
        self.bookings.lock().await.retain(|b| b.id != id);
        Ok(())
    }

    async fn update_booking(&self, id: BookingId, changes: &BookingChanges) -> StoreResult<Booking> {
        self.check_write()?;
        let mut bookings = self.bookings.lock().await;
        let booking = bookings.iter_mut().find(|b| b.id == id).ok_or("booking not found")?;

        booking.num_guests = changes.num_guests;
        booking.observations = changes.observations.clone();
        Ok(booking.clone())
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// A session fixed up front, for callers that already know who is signed in.
pub struct StaticSession(pub Option<Session>);

impl StaticSession {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn signed_in(guest: &Guest) -> Self {
        Self(Some(Session {
            user: SessionUser {
                name: guest.full_name.clone(),
                email: Masked(guest.email.clone()),
                guest_id: guest.id,
            },
        }))
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn session(&self) -> Option<Session> {
        self.0.clone()
    }
}

#[derive(Default)]
pub struct InMemoryRevocations {
    revoked: Mutex<HashSet<String>>,
}

impl InMemoryRevocations {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRevocations for InMemoryRevocations {
    async fn revoke(&self, token_id: &str, _ttl_seconds: u64) -> StoreResult<()> {
        self.revoked.lock().await.insert(token_id.to_string());
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> StoreResult<bool> {
        Ok(self.revoked.lock().await.contains(token_id))
    }
}

// ============================================================================
// Page Cache
// ============================================================================

/// Page cache that also records every invalidated path, in order.
#[derive(Default)]
pub struct InMemoryPageCache {
    entries: Mutex<HashMap<String, String>>,
    invalidated: Mutex<Vec<String>>,
}

impl InMemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().await.clone()
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, path: &str) -> Option<String> {
        self.entries.lock().await.get(path).cloned()
    }

    async fn put(&self, path: &str, body: &str) {
        self.entries.lock().await.insert(path.to_string(), body.to_string());
    }

    async fn invalidate(&self, path: &str) {
        self.entries.lock().await.remove(path);
        self.invalidated.lock().await.push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cabin(id: CabinId, name: &str) -> Cabin {
        Cabin {
            id,
            name: name.to_string(),
            max_capacity: 4,
            regular_price: 300,
            discount: 0,
            description: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_cabins_listed_by_name() {
        let store = InMemoryStore::with_cabins(vec![cabin(2, "008"), cabin(1, "001")]);
        let names: Vec<String> = store.list_cabins().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["001", "008"]);
        assert_eq!(store.get_cabin(2).await.unwrap().unwrap().name, "008");
    }

    #[tokio::test]
    async fn test_profile_update_without_flag_keeps_flag() {
        let store = InMemoryStore::new();
        let guest = store.seed_guest("jonas@example.com", "Jonas").await;

        let mut update = ProfileUpdate {
            nationality: "Portugal".to_string(),
            country_flag: Some("pt.svg".to_string()),
            national_id: Masked("AB12345".to_string()),
        };
        store.update_profile(guest.id, &update).await.unwrap();

        update.nationality = "Portuguese Republic".to_string();
        update.country_flag = None;
        store.update_profile(guest.id, &update).await.unwrap();

        let stored = store.guest(guest.id).await.unwrap();
        assert_eq!(stored.nationality.as_deref(), Some("Portuguese Republic"));
        assert_eq!(stored.country_flag.as_deref(), Some("pt.svg"));
    }

    #[tokio::test]
    async fn test_update_missing_booking_fails() {
        let store = InMemoryStore::new();
        let changes = BookingChanges { num_guests: 2, observations: String::new() };
        assert!(store.update_booking(42, &changes).await.is_err());
    }

    #[tokio::test]
    async fn test_page_cache_invalidate_drops_entry() {
        let cache = InMemoryPageCache::new();
        cache.put("/cabins/1", "{}").await;
        assert_eq!(cache.get("/cabins/1").await.as_deref(), Some("{}"));

        cache.invalidate("/cabins/1").await;
        assert!(cache.get("/cabins/1").await.is_none());
        assert_eq!(cache.invalidated().await, vec!["/cabins/1".to_string()]);
    }
}
