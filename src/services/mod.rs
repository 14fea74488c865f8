//! Business operations over the repositories.
//!
//! Services that move stock or create orders own their transactions; every
//! state change is followed by a domain event on the [`EventPublisher`].

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod publisher;

pub use auth::AuthService;
pub use cart::CartService;
pub use checkout::CheckoutService;
pub use inventory::InventoryService;
pub use publisher::EventPublisher;
