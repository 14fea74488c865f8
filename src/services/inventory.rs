//! Catalog and stock management for admins.

use sqlx::SqlitePool;
use tracing::instrument;

use crate::db::ProductRepository;
use crate::domain::aggregates::{NewProduct, Product};
use crate::domain::events::ProductEvent;
use crate::services::EventPublisher;
use crate::ShopError;

pub struct InventoryService<'a> {
    products: ProductRepository<'a>,
    events: &'a EventPublisher,
}

impl<'a> InventoryService<'a> {
    pub fn new(pool: &'a SqlitePool, events: &'a EventPublisher) -> Self {
        Self { products: ProductRepository::new(pool), events }
    }

    #[instrument(skip(self, product), fields(name = product.name()))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ShopError> {
        let created = self.products.create(product).await?;
        self.events
            .publish(ProductEvent::Created { product_id: created.id, name: created.name.clone(), stock: created.stock })
            .await;
        Ok(created)
    }

    /// Cart lines holding the product go with it.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i64) -> Result<(), ShopError> {
        if !self.products.delete(product_id).await? {
            return Err(ShopError::ProductNotFound);
        }
        self.events.publish(ProductEvent::Deleted { product_id }).await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_stock(&self, product_id: i64, stock: i64) -> Result<Product, ShopError> {
        if stock < 0 {
            return Err(ShopError::Validation("Stock cannot be negative.".into()));
        }
        if stock > NewProduct::MAX_STOCK {
            return Err(ShopError::Validation("Stock is too large.".into()));
        }
        let product = self.products.set_stock(product_id, stock).await?.ok_or(ShopError::ProductNotFound)?;
        self.events.publish(ProductEvent::StockSet { product_id, stock }).await;
        Ok(product)
    }
}
