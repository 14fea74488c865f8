//! Domain events
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    User(UserEvent),
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UserEvent {
    Registered { user_id: i64, username: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: i64, name: String, stock: i64 },
    Deleted { product_id: i64 },
    StockSet { product_id: i64, stock: i64 },
    StockReserved { product_id: i64, user_id: i64, quantity: i64 },
    StockReleased { product_id: i64, user_id: i64, quantity: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: i64, reference: String, user_id: i64, total_cents: i64 },
}

impl DomainEvent {
    /// Message subject, `shop.<aggregate>.<event>`.
    pub fn subject(&self) -> String {
        let (aggregate, event) = match self {
            Self::User(UserEvent::Registered { .. }) => ("users", "registered"),
            Self::Product(e) => (
                "products",
                match e {
                    ProductEvent::Created { .. } => "created",
                    ProductEvent::Deleted { .. } => "deleted",
                    ProductEvent::StockSet { .. } => "stock_set",
                    ProductEvent::StockReserved { .. } => "stock_reserved",
                    ProductEvent::StockReleased { .. } => "stock_released",
                },
            ),
            Self::Order(OrderEvent::Placed { .. }) => ("orders", "placed"),
        };
        format!("shop.{aggregate}.{event}")
    }
}

impl From<UserEvent> for DomainEvent {
    fn from(e: UserEvent) -> Self { Self::User(e) }
}

impl From<ProductEvent> for DomainEvent {
    fn from(e: ProductEvent) -> Self { Self::Product(e) }
}

impl From<OrderEvent> for DomainEvent {
    fn from(e: OrderEvent) -> Self { Self::Order(e) }
}
