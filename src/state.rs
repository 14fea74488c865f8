//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::EventPublisher;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    pool: SqlitePool,
    events: EventPublisher,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool, events: EventPublisher) -> Self {
        Self { inner: Arc::new(AppStateInner { config, pool, events }) }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn events(&self) -> &EventPublisher {
        &self.inner.events
    }
}
