//! Rows of the `orders`, `factions` and `figurine_types` tables.

use figtally_core::reference::{Faction, FigurineType, Order};
use figtally_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub image_url: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            name: row.name,
            description: row.description,
            logo_url: row.logo_url,
            image_url: row.image_url,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FactionRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub order_id: DbId,
    pub logo_url: String,
    pub image_url: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

impl From<FactionRow> for Faction {
    fn from(row: FactionRow) -> Self {
        Faction {
            id: row.id,
            name: row.name,
            description: row.description,
            order_id: row.order_id,
            logo_url: row.logo_url,
            image_url: row.image_url,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FigurineTypeRow {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

impl From<FigurineTypeRow> for FigurineType {
    fn from(row: FigurineTypeRow) -> Self {
        FigurineType {
            id: row.id,
            name: row.name,
        }
    }
}

/// DTO for seeding an order. `sort_order` falls back to the column default.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CreateFaction {
    pub name: String,
    pub order_id: DbId,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}
