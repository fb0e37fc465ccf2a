//! Guest-facing mutations: profile updates and the booking lifecycle.
//!
//! Every action authenticates first, then authorizes and validates, and only then
//! issues its single store write. A failed check never reaches the store.

use chrono::{DateTime, Utc};
use oasis_shared::Masked;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{
    Booking, BookingChanges, BookingId, BookingStatus, CabinId, Guest, GuestId, NewBooking,
    NewGuest, ProfileUpdate, Session,
};
use crate::paths;
use crate::repository::{BookingRepository, GuestRepository, PageCache, SessionProvider, StoreError};
use crate::{CoreError, CoreResult};

pub const MAX_OBSERVATIONS: usize = 1000;

const NOT_SIGNED_IN: &str = "You must be logged in to perform this action";

// ============================================================================
// Form Inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileForm {
    #[serde(rename = "nationalID")]
    pub national_id: String,
    /// `"<nationality>%<flag url>"`
    pub nationality: String,
}

/// Booking fields fixed by the reservation widget before the guest fills in the form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub cabin_id: CabinId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub num_nights: i32,
    pub cabin_price: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub num_guests: i32,
    #[serde(default)]
    pub observations: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingForm {
    pub booking_id: BookingId,
    pub num_guests: i32,
    #[serde(default)]
    pub observations: String,
}

/// How a successful action wants the caller to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Stay on the current page; its cached render has been refreshed.
    Revalidated,
    /// Navigate to the given path.
    Redirect(String),
}

// ============================================================================
// Input Rules
// ============================================================================

pub fn is_valid_national_id(national_id: &str) -> bool {
    (6..=12).contains(&national_id.len()) && national_id.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn truncate_observations(observations: &str) -> String {
    observations.chars().take(MAX_OBSERVATIONS).collect()
}

fn validate_num_guests(num_guests: i32) -> CoreResult<()> {
    if num_guests < 1 {
        return Err(CoreError::ValidationError("Number of guests must be at least 1".to_string()));
    }
    Ok(())
}

impl TryFrom<ProfileForm> for ProfileUpdate {
    type Error = CoreError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        if !is_valid_national_id(&form.national_id) {
            return Err(CoreError::ValidationError("Please provide a valid national ID".to_string()));
        }

        let (nationality, country_flag) = match form.nationality.split_once('%') {
            Some((nationality, flag)) => (nationality.to_string(), Some(flag.to_string())),
            None => (form.nationality, None),
        };

        Ok(ProfileUpdate {
            nationality,
            country_flag,
            national_id: Masked(form.national_id),
        })
    }
}

pub async fn require_session(sessions: &dyn SessionProvider) -> CoreResult<Session> {
    sessions
        .session()
        .await
        .ok_or_else(|| CoreError::AuthenticationError(NOT_SIGNED_IN.to_string()))
}

fn store_failure(message: &str, err: StoreError) -> CoreError {
    error!("{}: {}", message, err);
    CoreError::StoreError(message.to_string())
}

// ============================================================================
// Actions
// ============================================================================

/// Booking and profile actions bound to their store and page cache.
///
/// The session accessor is per request, so it is passed to each call instead.
#[derive(Clone)]
pub struct BookingActions {
    guests: Arc<dyn GuestRepository>,
    bookings: Arc<dyn BookingRepository>,
    pages: Arc<dyn PageCache>,
}

impl BookingActions {
    pub fn new(
        guests: Arc<dyn GuestRepository>,
        bookings: Arc<dyn BookingRepository>,
        pages: Arc<dyn PageCache>,
    ) -> Self {
        Self { guests, bookings, pages }
    }

    /// Sign-in callback: the guest for `email`, created on first visit.
    pub async fn begin_session(&self, email: &str, full_name: &str) -> CoreResult<Guest> {
        const FAILED: &str = "Guest could not be signed in";

        if let Some(guest) = self.guests.find_by_email(email).await.map_err(|e| store_failure(FAILED, e))? {
            return Ok(guest);
        }

        let guest = self
            .guests
            .create_guest(&NewGuest {
                full_name: full_name.to_string(),
                email: email.to_string(),
            })
            .await
            .map_err(|e| store_failure(FAILED, e))?;

        info!("Created guest {} for {}", guest.id, Masked(email));
        Ok(guest)
    }

    pub async fn profile(&self, sessions: &dyn SessionProvider) -> CoreResult<Option<Guest>> {
        let session = require_session(sessions).await?;
        self.guests
            .get_guest(session.guest_id())
            .await
            .map_err(|e| store_failure("Guest could not be loaded", e))
    }

    pub async fn reservations(&self, sessions: &dyn SessionProvider) -> CoreResult<Vec<Booking>> {
        let session = require_session(sessions).await?;
        self.guest_bookings(session.guest_id()).await
    }

    pub async fn update_guest(&self, sessions: &dyn SessionProvider, form: ProfileForm) -> CoreResult<ActionOutcome> {
        // 1. Authentication
        let session = require_session(sessions).await?;

        // 2. Validation
        let update = ProfileUpdate::try_from(form)?;

        // 3. Mutation
        self.guests
            .update_profile(session.guest_id(), &update)
            .await
            .map_err(|e| store_failure("Guest could not be updated", e))?;

        info!("Updated profile for guest {} (national ID {})", session.guest_id(), update.national_id);

        // 4. Revalidation
        self.pages.invalidate(paths::PROFILE).await;
        Ok(ActionOutcome::Revalidated)
    }

    pub async fn create_booking(
        &self,
        sessions: &dyn SessionProvider,
        draft: BookingDraft,
        form: BookingForm,
    ) -> CoreResult<ActionOutcome> {
        let session = require_session(sessions).await?;
        validate_num_guests(form.num_guests)?;

        let new_booking = NewBooking {
            start_date: draft.start_date,
            end_date: draft.end_date,
            num_nights: draft.num_nights,
            num_guests: form.num_guests,
            cabin_price: draft.cabin_price,
            extras_price: 0,
            total_price: draft.cabin_price,
            status: BookingStatus::Unconfirmed,
            has_breakfast: false,
            is_paid: false,
            observations: truncate_observations(&form.observations),
            cabin_id: draft.cabin_id,
            guest_id: session.guest_id(),
        };

        let booking = self
            .bookings
            .create_booking(&new_booking)
            .await
            .map_err(|e| store_failure("Booking could not be created", e))?;

        info!("Booking {} created for cabin {} by guest {}", booking.id, booking.cabin_id, booking.guest_id);

        self.pages.invalidate(&paths::cabin(draft.cabin_id)).await;
        Ok(ActionOutcome::Redirect(paths::THANK_YOU.to_string()))
    }

    pub async fn delete_booking(&self, sessions: &dyn SessionProvider, booking_id: BookingId) -> CoreResult<ActionOutcome> {
        let session = require_session(sessions).await?;
        self.ensure_owned(session.guest_id(), booking_id, "delete").await?;

        self.bookings
            .delete_booking(booking_id)
            .await
            .map_err(|e| store_failure("Booking could not be deleted", e))?;

        info!("Booking {} deleted by guest {}", booking_id, session.guest_id());

        self.pages.invalidate(paths::RESERVATIONS).await;
        Ok(ActionOutcome::Revalidated)
    }

    pub async fn update_booking(&self, sessions: &dyn SessionProvider, form: UpdateBookingForm) -> CoreResult<ActionOutcome> {
        let booking_id = form.booking_id;

        // 1. Authentication
        let session = require_session(sessions).await?;

        // 2. Authorization
        self.ensure_owned(session.guest_id(), booking_id, "update").await?;

        // 3. Update data
        validate_num_guests(form.num_guests)?;
        let changes = BookingChanges {
            num_guests: form.num_guests,
            observations: truncate_observations(&form.observations),
        };

        // 4. Mutation
        self.bookings
            .update_booking(booking_id, &changes)
            .await
            .map_err(|e| store_failure("Booking could not be updated", e))?;

        info!("Booking {} updated by guest {}", booking_id, session.guest_id());

        // 5. Revalidation and redirect
        self.pages.invalidate(&paths::edit_reservation(booking_id)).await;
        self.pages.invalidate(paths::RESERVATIONS).await;
        Ok(ActionOutcome::Redirect(paths::RESERVATIONS.to_string()))
    }

    async fn guest_bookings(&self, guest_id: GuestId) -> CoreResult<Vec<Booking>> {
        self.bookings
            .list_for_guest(guest_id)
            .await
            .map_err(|e| store_failure("Bookings could not be loaded", e))
    }

    async fn ensure_owned(&self, guest_id: GuestId, booking_id: BookingId, verb: &str) -> CoreResult<()> {
        let owned = self.guest_bookings(guest_id).await?;
        if !owned.iter().any(|booking| booking.id == booking_id) {
            return Err(CoreError::AuthorizationError(format!(
                "You are not allowed to {} this booking",
                verb
            )));
        }
        Ok(())
    }
}
