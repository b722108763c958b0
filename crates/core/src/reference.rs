//! Reference data a definition points at: orders, factions and figurine types.
//!
//! These records are maintained outside this crate; the figurine flows only
//! read them to validate ids and to populate views.

use serde::Serialize;

use crate::types::DbId;

/// Default sort position for orders and factions created without one.
pub const DEFAULT_SORT_ORDER: i32 = 999;

/// A grand alliance grouping several factions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub image_url: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faction {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub order_id: DbId,
    pub logo_url: String,
    pub image_url: String,
    pub sort_order: i32,
}

/// Unit category such as "Infantry" or "Cavalry".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FigurineType {
    pub id: DbId,
    pub name: String,
}
