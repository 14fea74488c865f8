//! HTTP middleware and request extractors.
//!
//! # Layer order (outermost first)
//!
//! 1. `TraceLayer` (request tracing)
//! 2. Session layer (tower-sessions, SQLite store)
//!
//! Authentication is enforced per handler with the extractors in [`auth`].

pub mod auth;
pub mod session;

pub use auth::{OptionalUser, RequireAdmin, RequireUser};
pub use session::{create_session_layer, flash, session_store, take_flashes, CurrentUser};
