//! Repository for the `figurine_types` table.

use figtally_core::types::DbId;
use sqlx::PgPool;

use crate::models::reference::FigurineTypeRow;

const COLUMNS: &str = "id, name, created_at";

pub struct FigurineTypeRepo;

impl FigurineTypeRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<FigurineTypeRow, sqlx::Error> {
        let query = format!("INSERT INTO figurine_types (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, FigurineTypeRow>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FigurineTypeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM figurine_types WHERE id = $1");
        sqlx::query_as::<_, FigurineTypeRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<FigurineTypeRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM figurine_types ORDER BY name ASC");
        sqlx::query_as::<_, FigurineTypeRow>(&query)
            .fetch_all(pool)
            .await
    }
}
