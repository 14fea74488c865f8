//! Checkout: cart lines become one immutable order.

use sqlx::SqlitePool;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::domain::aggregates::{Cart, NewOrder, Order, PricedLine};
use crate::domain::events::OrderEvent;
use crate::services::EventPublisher;
use crate::ShopError;

pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
    events: &'a EventPublisher,
}

impl<'a> CheckoutService<'a> {
    pub fn new(pool: &'a SqlitePool, events: &'a EventPublisher) -> Self {
        Self { pool, events }
    }

    /// Turn the user's cart into an order priced at current product prices.
    ///
    /// The cart lines are claimed by the transaction's first statement, so
    /// a second concurrent checkout sees an empty cart.
    ///
    /// # Errors
    ///
    /// `ShopError::EmptyCart` when there is nothing to buy; nothing changes.
    #[instrument(skip(self))]
    pub async fn checkout(&self, user_id: i64) -> Result<Order, ShopError> {
        let mut tx = self.pool.begin().await?;

        let claimed: Vec<(i64, i64)> =
            sqlx::query_as("DELETE FROM cart_items WHERE user_id = ?1 RETURNING product_id, quantity")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await?;

        let mut cart = Cart::new(user_id);
        for (product_id, quantity) in claimed {
            let (name, unit_price_cents): (String, i64) =
                sqlx::query_as("SELECT name, price_cents FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_one(&mut *tx)
                    .await?;
            cart.add_line(PricedLine { product_id, name, unit_price_cents, quantity });
        }

        let new_order = match NewOrder::from_cart(&cart) {
            Ok(order) => order,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };
        let order = OrderRepository::insert(&mut *tx, &new_order).await?;
        tx.commit().await?;

        tracing::info!(order_id = order.id, total = %order.total(), "Order placed");
        self.events
            .publish(OrderEvent::Placed {
                order_id: order.id,
                reference: order.reference.clone(),
                user_id,
                total_cents: order.total_cents,
            })
            .await;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, CartRepository, OrderRepository, ProductRepository, UserRepository};
    use crate::domain::aggregates::NewProduct;
    use crate::domain::value_objects::{Money, Username};
    use crate::services::CartService;

    #[tokio::test]
    async fn test_checkout_creates_one_order_and_empties_cart() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let user = UserRepository::new(&pool).create(&Username::new("hal").unwrap(), "hash", false).await.unwrap();
        let products = ProductRepository::new(&pool);
        let pen = products.create(&NewProduct::new("Pen", Money::from_cents(150), None, 10).unwrap()).await.unwrap();
        let pad = products.create(&NewProduct::new("Pad", Money::from_cents(425), None, 10).unwrap()).await.unwrap();

        let carts = CartService::new(&pool, &events);
        carts.add(user.id, pen.id, 4).await.unwrap();
        carts.add(user.id, pad.id, 2).await.unwrap();

        let order = CheckoutService::new(&pool, &events).checkout(user.id).await.unwrap();
        assert_eq!(order.total_cents, 4 * 150 + 2 * 425);
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.loyalty_points(), 1);

        assert!(carts.view(user.id).await.unwrap().is_empty());
        assert_eq!(OrderRepository::new(&pool).count().await.unwrap(), 1);
        // Stock was taken at add time, checkout leaves it alone.
        assert_eq!(products.get(pen.id).await.unwrap().unwrap().stock, 6);
    }

    #[tokio::test]
    async fn test_checkout_uses_current_prices() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let user = UserRepository::new(&pool).create(&Username::new("ivy").unwrap(), "hash", false).await.unwrap();
        let cup = ProductRepository::new(&pool)
            .create(&NewProduct::new("Cup", Money::from_cents(500), None, 5).unwrap())
            .await
            .unwrap();
        CartService::new(&pool, &events).add(user.id, cup.id, 2).await.unwrap();
        sqlx::query("UPDATE products SET price_cents = 650 WHERE id = ?1").bind(cup.id).execute(&pool).await.unwrap();

        let order = CheckoutService::new(&pool, &events).checkout(user.id).await.unwrap();
        assert_eq!(order.total_cents, 1300);
        assert_eq!(order.items()[0].unit_price_cents, 650);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_changes_nothing() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let user = UserRepository::new(&pool).create(&Username::new("jay").unwrap(), "hash", false).await.unwrap();

        let err = CheckoutService::new(&pool, &events).checkout(user.id).await.unwrap_err();
        assert!(matches!(err, ShopError::EmptyCart));
        assert_eq!(OrderRepository::new(&pool).count().await.unwrap(), 0);
        assert_eq!(CartRepository::new(&pool).count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_oversized_cart_is_rejected_and_kept() {
        let pool = test_pool().await;
        let events = EventPublisher::disabled();
        let user = UserRepository::new(&pool).create(&Username::new("kim").unwrap(), "hash", false).await.unwrap();
        // Rows written before price and stock were capped.
        let product_id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, price_cents, stock) VALUES ('Yacht', ?1, 0) RETURNING id",
        )
        .bind(i64::MAX)
        .fetch_one(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO cart_items (user_id, product_id, quantity) VALUES (?1, ?2, ?3)")
            .bind(user.id)
            .bind(product_id)
            .bind(1_000_000_000_000_i64)
            .execute(&pool)
            .await
            .unwrap();

        let err = CheckoutService::new(&pool, &events).checkout(user.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Amount is too large.");
        assert_eq!(OrderRepository::new(&pool).count().await.unwrap(), 0);
        assert_eq!(CartRepository::new(&pool).count().await.unwrap(), 1);
    }
}
