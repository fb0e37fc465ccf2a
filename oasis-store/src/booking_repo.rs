use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oasis_core::models::{Booking, BookingChanges, BookingId, BookingStatus, GuestId, NewBooking};
use oasis_core::repository::{BookingRepository, StoreError, StoreResult};
use sqlx::PgPool;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    created_at: DateTime<Utc>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    num_nights: i32,
    num_guests: i32,
    cabin_price: i32,
    extras_price: i32,
    total_price: i32,
    status: String,
    has_breakfast: bool,
    is_paid: bool,
    observations: String,
    cabin_id: i64,
    guest_id: i64,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            created_at: row.created_at,
            start_date: row.start_date,
            end_date: row.end_date,
            num_nights: row.num_nights,
            num_guests: row.num_guests,
            cabin_price: row.cabin_price,
            extras_price: row.extras_price,
            total_price: row.total_price,
            status: row.status.parse::<BookingStatus>()?,
            has_breakfast: row.has_breakfast,
            is_paid: row.is_paid,
            observations: row.observations,
            cabin_id: row.cabin_id,
            guest_id: row.guest_id,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, created_at, start_date, end_date, num_nights, num_guests, \
    cabin_price, extras_price, total_price, status, has_breakfast, is_paid, observations, cabin_id, guest_id";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn list_for_guest(&self, guest_id: GuestId) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE guest_id = $1 ORDER BY start_date DESC",
            BOOKING_COLUMNS
        ))
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn create_booking(&self, booking: &NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (start_date, end_date, num_nights, num_guests, cabin_price, extras_price,
                                  total_price, status, has_breakfast, is_paid, observations, cabin_id, guest_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.num_nights)
        .bind(booking.num_guests)
        .bind(booking.cabin_price)
        .bind(booking.extras_price)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.has_breakfast)
        .bind(booking.is_paid)
        .bind(&booking.observations)
        .bind(booking.cabin_id)
        .bind(booking.guest_id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_booking(&self, id: BookingId) -> StoreResult<()> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_booking(&self, id: BookingId, changes: &BookingChanges) -> StoreResult<Booking> {
        // fetch_one: no matching row is an error
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET num_guests = $1, observations = $2 WHERE id = $3 RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(changes.num_guests)
        .bind(&changes.observations)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }
}
