//! Cart reads. Writes that move stock live in `services::cart`.

use sqlx::SqlitePool;

use crate::domain::aggregates::{Cart, CartLine, PricedLine};
use crate::ShopError;

pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The user's cart priced at current product prices.
    pub async fn cart_for_user(&self, user_id: i64) -> Result<Cart, ShopError> {
        let lines = sqlx::query_as::<_, PricedLine>(
            r#"
            SELECT c.product_id, p.name, p.price_cents AS unit_price_cents, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1
            ORDER BY c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(Cart::from_lines(user_id, lines))
    }

    pub async fn lines_for_user(&self, user_id: i64) -> Result<Vec<CartLine>, ShopError> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT id, user_id, product_id, quantity FROM cart_items WHERE user_id = ?1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(lines)
    }

    pub async fn count(&self) -> Result<i64, ShopError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM cart_items").fetch_one(self.pool).await?)
    }
}
