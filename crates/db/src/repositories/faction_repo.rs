//! Repository for the `factions` table.

use figtally_core::types::DbId;
use sqlx::PgPool;

use crate::models::reference::{CreateFaction, FactionRow};

const COLUMNS: &str =
    "id, name, description, order_id, logo_url, image_url, sort_order, created_at";

pub struct FactionRepo;

impl FactionRepo {
    /// Insert a new faction under an existing order.
    pub async fn create(pool: &PgPool, input: &CreateFaction) -> Result<FactionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO factions (name, order_id, description, logo_url, image_url, sort_order)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, ''), COALESCE($5, ''), COALESCE($6, 999))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FactionRow>(&query)
            .bind(&input.name)
            .bind(input.order_id)
            .bind(&input.description)
            .bind(&input.logo_url)
            .bind(&input.image_url)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FactionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM factions WHERE id = $1");
        sqlx::query_as::<_, FactionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all factions by sort order, then name.
    pub async fn list(pool: &PgPool) -> Result<Vec<FactionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM factions ORDER BY sort_order ASC, name ASC");
        sqlx::query_as::<_, FactionRow>(&query).fetch_all(pool).await
    }
}
