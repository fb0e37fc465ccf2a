//! Page paths used for cache invalidation and redirects.

use crate::models::{BookingId, CabinId};

pub const HOME: &str = "/";
pub const ACCOUNT: &str = "/account";
pub const PROFILE: &str = "/account/profile";
pub const RESERVATIONS: &str = "/account/reservations";
pub const THANK_YOU: &str = "/cabins/thankyou";

pub fn cabin(cabin_id: CabinId) -> String {
    format!("/cabins/{}", cabin_id)
}

pub fn edit_reservation(booking_id: BookingId) -> String {
    format!("/account/reservations/edit/{}", booking_id)
}
