//! Cart operations that move stock.
//!
//! Adding to the cart reserves stock and removing a line releases it. The
//! stock check and decrement are one conditional `UPDATE`, so concurrent
//! adds for the same product cannot oversell.

use sqlx::SqlitePool;
use tracing::instrument;

use crate::db::CartRepository;
use crate::domain::aggregates::{Cart, CartLine, Product};
use crate::domain::events::ProductEvent;
use crate::domain::value_objects::Quantity;
use crate::services::EventPublisher;
use crate::ShopError;

pub struct CartService<'a> {
    pool: &'a SqlitePool,
    events: &'a EventPublisher,
}

impl<'a> CartService<'a> {
    pub fn new(pool: &'a SqlitePool, events: &'a EventPublisher) -> Self {
        Self { pool, events }
    }

    pub async fn view(&self, user_id: i64) -> Result<Cart, ShopError> {
        CartRepository::new(self.pool).cart_for_user(user_id).await
    }

    /// Reserve `quantity` units and create or grow the user's line.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `ProductNotFound` or `InsufficientStock`; on any
    /// error neither stock nor the cart changes.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartLine, ShopError> {
        let quantity = Quantity::new(quantity)?;
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query("UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1")
            .bind(quantity.value())
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if reserved == 0 {
            let product = sqlx::query_as::<_, Product>(
                "SELECT id, name, price_cents, description, stock FROM products WHERE id = ?1",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
            tx.rollback().await?;
            let product = product.ok_or(ShopError::ProductNotFound)?;
            product.check_available(quantity)?;
            // Stock moved between the two statements; report what we saw.
            return Err(ShopError::InsufficientStock { available: product.stock, requested: quantity.value() });
        }

        let line = sqlx::query_as::<_, CartLine>(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity) VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = cart_items.quantity + excluded.quantity
            RETURNING id, user_id, product_id, quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity.value())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events
            .publish(ProductEvent::StockReserved { product_id, user_id, quantity: quantity.value() })
            .await;
        Ok(line)
    }

    /// Drop the user's line for a product and return its units to stock.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: i64, product_id: i64) -> Result<Quantity, ShopError> {
        let mut tx = self.pool.begin().await?;

        let released: Option<i64> =
            sqlx::query_scalar("DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2 RETURNING quantity")
                .bind(user_id)
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(released) = released else {
            tx.rollback().await?;
            return Err(ShopError::CartLineNotFound);
        };

        sqlx::query("UPDATE products SET stock = stock + ?1 WHERE id = ?2")
            .bind(released)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.events
            .publish(ProductEvent::StockReleased { product_id, user_id, quantity: released })
            .await;
        Quantity::new(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{file_pool, test_pool, ProductRepository, UserRepository};
    use std::sync::Arc;
    use tokio::sync::Barrier;
    use crate::domain::aggregates::NewProduct;
    use crate::domain::value_objects::{Money, Username};

    async fn seed(pool: &SqlitePool, stock: i64) -> (i64, i64) {
        let user = UserRepository::new(pool).create(&Username::new("gina").unwrap(), "hash", false).await.unwrap();
        let product = ProductRepository::new(pool)
            .create(&NewProduct::new("Kettle", Money::from_cents(3000), None, stock).unwrap())
            .await
            .unwrap();
        (user.id, product.id)
    }

    async fn stock_of(pool: &SqlitePool, product_id: i64) -> i64 {
        ProductRepository::new(pool).get(product_id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_add_twice_merges_into_one_line() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let (user_id, product_id) = seed(&pool, 10).await;
        let carts = CartService::new(&pool, &events);

        carts.add(user_id, product_id, 2).await.unwrap();
        let line = carts.add(user_id, product_id, 3).await.unwrap();
        assert_eq!(line.quantity, 5);

        let lines = CartRepository::new(&pool).lines_for_user(user_id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
        assert_eq!(stock_of(&pool, product_id).await, 5);
    }

    #[tokio::test]
    async fn test_add_rejects_more_than_stock() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let (user_id, product_id) = seed(&pool, 2).await;
        let carts = CartService::new(&pool, &events);

        let err = carts.add(user_id, product_id, 3).await.unwrap_err();
        assert!(matches!(err, ShopError::InsufficientStock { available: 2, requested: 3 }));
        assert_eq!(stock_of(&pool, product_id).await, 2);
        assert_eq!(CartRepository::new(&pool).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let (user_id, product_id) = seed(&pool, 2).await;
        let carts = CartService::new(&pool, &events);

        assert!(matches!(carts.add(user_id, product_id, 0).await, Err(ShopError::InvalidQuantity)));
        assert!(matches!(carts.add(user_id, product_id, -5).await, Err(ShopError::InvalidQuantity)));
        assert!(matches!(carts.add(user_id, product_id + 1, 1).await, Err(ShopError::ProductNotFound)));
        assert_eq!(stock_of(&pool, product_id).await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let pool = file_pool(&dir).await;
        let events = EventPublisher::disabled();
        let (_, product_id) = seed(&pool, 7).await;

        let users = UserRepository::new(&pool);
        let mut shoppers = Vec::new();
        for n in 0..20 {
            let user = users.create(&Username::new(format!("shopper{n}")).unwrap(), "hash", false).await.unwrap();
            shoppers.push(user.id);
        }

        let barrier = Arc::new(Barrier::new(shoppers.len()));
        let mut handles = Vec::new();
        for user_id in shoppers {
            let pool = pool.clone();
            let events = events.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                CartService::new(&pool, &events).add(user_id, product_id, 1).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(ShopError::InsufficientStock { requested: 1, .. }) => {}
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }

        assert_eq!(accepted, 7);
        assert_eq!(stock_of(&pool, product_id).await, 0);
        let reserved: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(reserved, 7);
    }

    #[tokio::test]
    async fn test_remove_releases_stock() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let (user_id, product_id) = seed(&pool, 6).await;
        let carts = CartService::new(&pool, &events);

        carts.add(user_id, product_id, 4).await.unwrap();
        assert_eq!(stock_of(&pool, product_id).await, 2);

        assert_eq!(carts.remove(user_id, product_id).await.unwrap().value(), 4);
        assert_eq!(stock_of(&pool, product_id).await, 6);
        assert!(carts.view(user_id).await.unwrap().is_empty());
        assert!(matches!(carts.remove(user_id, product_id).await, Err(ShopError::CartLineNotFound)));
    }
}
