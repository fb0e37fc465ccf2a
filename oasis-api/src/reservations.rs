use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use oasis_core::actions::{BookingDraft, BookingForm, UpdateBookingForm};
use oasis_core::models::{BookingId, CabinId};
use oasis_core::Booking;
use serde::Deserialize;

use crate::error::AppError;
use crate::navigate;
use crate::session::RequestSession;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

/// Reservation widget fields plus the guest's form, posted together.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingForm {
    pub cabin_id: CabinId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub num_nights: i32,
    pub cabin_price: i32,
    pub num_guests: i32,
    #[serde(default)]
    pub observations: String,
}

impl CreateBookingForm {
    fn split(self) -> (BookingDraft, BookingForm) {
        (
            BookingDraft {
                cabin_id: self.cabin_id,
                start_date: self.start_date,
                end_date: self.end_date,
                num_nights: self.num_nights,
                cabin_price: self.cabin_price,
            },
            BookingForm {
                num_guests: self.num_guests,
                observations: self.observations,
            },
        )
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/account/reservations", get(list_reservations))
        .route("/account/reservations/{id}", delete(delete_reservation))
        .route("/account/reservations/edit", post(update_reservation))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /account/reservations
async fn list_reservations(
    State(state): State<AppState>,
    session: RequestSession,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.actions.reservations(&session).await?;
    Ok(Json(bookings))
}

/// POST /bookings
/// Redirects to the thank-you page.
async fn create_booking(
    State(state): State<AppState>,
    session: RequestSession,
    Form(form): Form<CreateBookingForm>,
) -> Result<Response, AppError> {
    let (draft, form) = form.split();
    let outcome = state.actions.create_booking(&session, draft, form).await?;
    Ok(navigate(outcome))
}

/// DELETE /account/reservations/:id
async fn delete_reservation(
    State(state): State<AppState>,
    session: RequestSession,
    Path(booking_id): Path<BookingId>,
) -> Result<Response, AppError> {
    let outcome = state.actions.delete_booking(&session, booking_id).await?;
    Ok(navigate(outcome))
}

/// POST /account/reservations/edit
/// Redirects back to the reservation list.
async fn update_reservation(
    State(state): State<AppState>,
    session: RequestSession,
    Form(form): Form<UpdateBookingForm>,
) -> Result<Response, AppError> {
    let outcome = state.actions.update_booking(&session, form).await?;
    Ok(navigate(outcome))
}
