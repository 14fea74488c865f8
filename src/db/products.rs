//! Product repository.

use sqlx::SqlitePool;

use crate::domain::aggregates::{NewProduct, Product};
use crate::ShopError;

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, price_cents, description, stock";

/// Repository for catalog reads and admin writes.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Product>, ShopError> {
        let products = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>, ShopError> {
        let product = sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, ShopError> {
        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, price_cents, description, stock) VALUES (?1, ?2, ?3, ?4) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.name())
        .bind(product.price().cents()?)
        .bind(product.description())
        .bind(product.stock())
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// Returns `false` when no such product exists.
    pub async fn delete(&self, id: i64) -> Result<bool, ShopError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1").bind(id).execute(self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the stock count. Callers validate `stock >= 0`.
    pub async fn set_stock(&self, id: i64, stock: i64) -> Result<Option<Product>, ShopError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET stock = ?1 WHERE id = ?2 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(stock)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }
}
