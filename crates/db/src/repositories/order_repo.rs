//! Repository for the `orders` table.

use figtally_core::types::DbId;
use sqlx::PgPool;

use crate::models::reference::{CreateOrder, OrderRow};

const COLUMNS: &str = "id, name, description, logo_url, image_url, sort_order, created_at";

pub struct OrderRepo;

impl OrderRepo {
    /// Insert a new order. Omitted fields take their column defaults.
    pub async fn create(pool: &PgPool, input: &CreateOrder) -> Result<OrderRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (name, description, logo_url, image_url, sort_order)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''), COALESCE($5, 999))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.logo_url)
            .bind(&input.image_url)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<OrderRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
