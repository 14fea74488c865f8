//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartLine, PricedLine};
pub use order::{NewOrder, Order, OrderItem};
pub use product::{NewProduct, Product, StockStatus};
pub use user::User;
