use async_trait::async_trait;
use oasis_core::models::{Cabin, CabinId};
use oasis_core::repository::{CabinRepository, StoreResult};
use sqlx::PgPool;

pub struct PgCabinRepository {
    pool: PgPool,
}

impl PgCabinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CabinRow {
    id: i64,
    name: String,
    max_capacity: i32,
    regular_price: i32,
    discount: i32,
    description: Option<String>,
    image: Option<String>,
}

impl From<CabinRow> for Cabin {
    fn from(row: CabinRow) -> Self {
        Cabin {
            id: row.id,
            name: row.name,
            max_capacity: row.max_capacity,
            regular_price: row.regular_price,
            discount: row.discount,
            description: row.description,
            image: row.image,
        }
    }
}

const CABIN_COLUMNS: &str = "id, name, max_capacity, regular_price, discount, description, image";

#[async_trait]
impl CabinRepository for PgCabinRepository {
    async fn list_cabins(&self) -> StoreResult<Vec<Cabin>> {
        let rows = sqlx::query_as::<_, CabinRow>(&format!(
            "SELECT {} FROM cabins ORDER BY name",
            CABIN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Cabin::from).collect())
    }

    async fn get_cabin(&self, id: CabinId) -> StoreResult<Option<Cabin>> {
        let row = sqlx::query_as::<_, CabinRow>(&format!(
            "SELECT {} FROM cabins WHERE id = $1",
            CABIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cabin::from))
    }
}
