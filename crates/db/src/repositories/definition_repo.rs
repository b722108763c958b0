//! Repository for the `figurine_definitions` table.

use figtally_core::definition::{DefinitionChanges, NewDefinition};
use figtally_core::types::DbId;
use sqlx::PgPool;

use crate::models::figurine::DefinitionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, faction_id, figurine_type_id, image_url, created_at";

/// Provides CRUD operations for figurine definitions. There is no delete.
pub struct DefinitionRepo;

impl DefinitionRepo {
    /// Insert a new definition, returning the created row.
    ///
    /// Fails with a `uq_figurine_definitions_name` violation if the name is taken.
    pub async fn create(pool: &PgPool, input: &NewDefinition) -> Result<DefinitionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO figurine_definitions (name, description, faction_id, figurine_type_id, image_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DefinitionRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.faction_id)
            .bind(input.figurine_type_id)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DefinitionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM figurine_definitions WHERE id = $1");
        sqlx::query_as::<_, DefinitionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a definition by its exact (case-sensitive) name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<DefinitionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM figurine_definitions WHERE name = $1");
        sqlx::query_as::<_, DefinitionRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List every definition in byte order of name, ignoring the database
    /// collation.
    pub async fn list(pool: &PgPool) -> Result<Vec<DefinitionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM figurine_definitions ORDER BY name COLLATE \"C\" ASC, id ASC"
        );
        sqlx::query_as::<_, DefinitionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a definition. Only non-`None` fields in `changes` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &DefinitionChanges,
    ) -> Result<Option<DefinitionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE figurine_definitions SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                faction_id = COALESCE($5, faction_id),
                figurine_type_id = COALESCE($6, figurine_type_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DefinitionRow>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(&changes.image_url)
            .bind(changes.faction_id)
            .bind(changes.figurine_type_id)
            .fetch_optional(pool)
            .await
    }
}
