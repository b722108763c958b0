//! Repository for the `figurines` (possession) table.

use figtally_core::possession::{NewPossession, Quantities};
use figtally_core::types::DbId;
use sqlx::PgPool;

use crate::models::figurine::PossessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, figurine_definition_id, user_id, on_sprue, assembled, painted, needed, \
                        created_at";

/// Provides CRUD operations for possessions.
pub struct PossessionRepo;

impl PossessionRepo {
    /// Insert a new possession, returning the created row.
    ///
    /// Fails with a `uq_figurines_definition_user` violation if the user
    /// already owns the definition.
    pub async fn create(pool: &PgPool, input: &NewPossession) -> Result<PossessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO figurines
                (figurine_definition_id, user_id, on_sprue, assembled, painted, needed)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let q = &input.quantities;
        sqlx::query_as::<_, PossessionRow>(&query)
            .bind(input.figurine_definition_id)
            .bind(input.user_id)
            .bind(q.on_sprue)
            .bind(q.assembled)
            .bind(q.painted)
            .bind(q.needed)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PossessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM figurines WHERE id = $1");
        sqlx::query_as::<_, PossessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the unique possession for a (definition, user) pair.
    pub async fn find_by_definition_and_user(
        pool: &PgPool,
        figurine_definition_id: DbId,
        user_id: DbId,
    ) -> Result<Option<PossessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM figurines
             WHERE figurine_definition_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, PossessionRow>(&query)
            .bind(figurine_definition_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<PossessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM figurines WHERE user_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, PossessionRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<PossessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM figurines ORDER BY id ASC");
        sqlx::query_as::<_, PossessionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Overwrite all four quantity columns.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_quantities(
        pool: &PgPool,
        id: DbId,
        quantities: &Quantities,
    ) -> Result<Option<PossessionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE figurines SET
                on_sprue = $2,
                assembled = $3,
                painted = $4,
                needed = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PossessionRow>(&query)
            .bind(id)
            .bind(quantities.on_sprue)
            .bind(quantities.assembled)
            .bind(quantities.painted)
            .bind(quantities.needed)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a possession. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM figurines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
