use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oasis_core::models::{Guest, GuestId, NewGuest, ProfileUpdate};
use oasis_core::repository::{GuestRepository, StoreResult};
use oasis_shared::Masked;
use sqlx::PgPool;
use tracing::warn;

pub struct PgGuestRepository {
    pool: PgPool,
}

impl PgGuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct GuestRow {
    id: i64,
    full_name: String,
    email: String,
    national_id: Option<String>,
    nationality: Option<String>,
    country_flag: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<GuestRow> for Guest {
    fn from(row: GuestRow) -> Self {
        Guest {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            national_id: row.national_id.map(Masked),
            nationality: row.nationality,
            country_flag: row.country_flag,
            created_at: row.created_at,
        }
    }
}

const GUEST_COLUMNS: &str = "id, full_name, email, national_id, nationality, country_flag, created_at";

#[async_trait]
impl GuestRepository for PgGuestRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            "SELECT {} FROM guests WHERE email = $1",
            GUEST_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Guest::from))
    }

    async fn get_guest(&self, id: GuestId) -> StoreResult<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            "SELECT {} FROM guests WHERE id = $1",
            GUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Guest::from))
    }

    async fn create_guest(&self, guest: &NewGuest) -> StoreResult<Guest> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            "INSERT INTO guests (full_name, email) VALUES ($1, $2) RETURNING {}",
            GUEST_COLUMNS
        ))
        .bind(&guest.full_name)
        .bind(&guest.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_profile(&self, id: GuestId, update: &ProfileUpdate) -> StoreResult<()> {
        // A missing flag leaves the stored one in place
        let result = sqlx::query(
            r#"
            UPDATE guests
            SET nationality = $1, country_flag = COALESCE($2, country_flag), national_id = $3
            WHERE id = $4
            "#,
        )
        .bind(&update.nationality)
        .bind(&update.country_flag)
        .bind(update.national_id.expose())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("Profile update matched no guest row for id {}", id);
        }
        Ok(())
    }
}
