//! Order repository.

use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::aggregates::{NewOrder, Order};
use crate::ShopError;

const ORDER_COLUMNS: &str = "id, reference, user_id, items, total_cents, created_at";

pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert on a caller-owned connection so checkout can keep it in its transaction.
    pub async fn insert(conn: &mut SqliteConnection, order: &NewOrder) -> Result<Order, ShopError> {
        let created = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (reference, user_id, items, total_cents, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.reference.to_string())
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.total.cents()?)
        .bind(order.created_at)
        .fetch_one(&mut *conn)
        .await?;
        Ok(created)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Order>, ShopError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn list(&self) -> Result<Vec<Order>, ShopError> {
        let orders = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id DESC"))
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn count(&self) -> Result<i64, ShopError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(self.pool).await?)
    }
}
