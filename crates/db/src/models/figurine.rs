//! Rows of the `figurine_definitions` and `figurines` tables.

use figtally_core::definition::FigurineDefinition;
use figtally_core::possession::{Possession, Quantities};
use figtally_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct DefinitionRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub faction_id: DbId,
    pub figurine_type_id: DbId,
    pub image_url: String,
    pub created_at: Timestamp,
}

impl From<DefinitionRow> for FigurineDefinition {
    fn from(row: DefinitionRow) -> Self {
        FigurineDefinition {
            id: row.id,
            name: row.name,
            description: row.description,
            faction_id: row.faction_id,
            figurine_type_id: row.figurine_type_id,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// A possession row. The table keeps the original `figurines` name.
#[derive(Debug, Clone, FromRow)]
pub struct PossessionRow {
    pub id: DbId,
    pub figurine_definition_id: DbId,
    pub user_id: DbId,
    pub on_sprue: i32,
    pub assembled: i32,
    pub painted: i32,
    pub needed: i32,
    pub created_at: Timestamp,
}

impl From<PossessionRow> for Possession {
    fn from(row: PossessionRow) -> Self {
        Possession {
            id: row.id,
            figurine_definition_id: row.figurine_definition_id,
            user_id: row.user_id,
            quantities: Quantities {
                on_sprue: row.on_sprue,
                assembled: row.assembled,
                painted: row.painted,
                needed: row.needed,
            },
            created_at: row.created_at,
        }
    }
}
