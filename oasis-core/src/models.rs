use chrono::{DateTime, Utc};
use oasis_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

pub type CabinId = i64;
pub type GuestId = i64;
pub type BookingId = i64;

// ============================================================================
// Cabins
// ============================================================================

/// A rentable cabin. Read-only from this service's point of view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cabin {
    pub id: CabinId,
    pub name: String,
    pub max_capacity: i32,
    pub regular_price: i32,
    pub discount: i32,
    pub description: Option<String>,
    pub image: Option<String>,
}

// ============================================================================
// Guests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,
    pub full_name: String,
    pub email: String,
    #[serde(rename = "nationalID")]
    pub national_id: Option<Masked<String>>,
    pub nationality: Option<String>,
    pub country_flag: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Guest record created on first sign-in.
#[derive(Debug, Clone)]
pub struct NewGuest {
    pub full_name: String,
    pub email: String,
}

/// Profile fields a guest may change. `country_flag: None` keeps the stored flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub nationality: String,
    pub country_flag: Option<String>,
    pub national_id: Masked<String>,
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Unconfirmed,
    CheckedIn,
    CheckedOut,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Unconfirmed => "unconfirmed",
            BookingStatus::CheckedIn => "checked-in",
            BookingStatus::CheckedOut => "checked-out",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unconfirmed" => Ok(BookingStatus::Unconfirmed),
            "checked-in" => Ok(BookingStatus::CheckedIn),
            "checked-out" => Ok(BookingStatus::CheckedOut),
            other => Err(CoreError::ValidationError(format!("Unknown booking status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub created_at: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub num_nights: i32,
    pub num_guests: i32,
    pub cabin_price: i32,
    pub extras_price: i32,
    pub total_price: i32,
    pub status: BookingStatus,
    pub has_breakfast: bool,
    pub is_paid: bool,
    pub observations: String,
    pub cabin_id: CabinId,
    pub guest_id: GuestId,
}

/// A fully assembled booking ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub num_nights: i32,
    pub num_guests: i32,
    pub cabin_price: i32,
    pub extras_price: i32,
    pub total_price: i32,
    pub status: BookingStatus,
    pub has_breakfast: bool,
    pub is_paid: bool,
    pub observations: String,
    pub cabin_id: CabinId,
    pub guest_id: GuestId,
}

/// Fields a guest may change on an existing booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingChanges {
    pub num_guests: i32,
    pub observations: String,
}

// ============================================================================
// Sessions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub name: String,
    pub email: Masked<String>,
    pub guest_id: GuestId,
}

/// The signed-in caller for a single request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user: SessionUser,
}

impl Session {
    pub fn guest_id(&self) -> GuestId {
        self.user.guest_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_wire_format() {
        assert_eq!(serde_json::to_string(&BookingStatus::CheckedIn).unwrap(), "\"checked-in\"");
        assert_eq!("unconfirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Unconfirmed);
        assert!("confirmed".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_guest_debug_masks_national_id() {
        let guest = Guest {
            id: 1,
            full_name: "Jonas Schmedtmann".to_string(),
            email: "jonas@example.com".to_string(),
            national_id: Some(Masked("AB12345".to_string())),
            nationality: Some("Portugal".to_string()),
            country_flag: None,
            created_at: Utc::now(),
        };

        let debug = format!("{:?}", guest);
        assert!(!debug.contains("AB12345"));

        let json = serde_json::to_value(&guest).unwrap();
        assert_eq!(json["nationalID"], "AB12345");
        assert_eq!(json["fullName"], "Jonas Schmedtmann");
    }
}
