//! Shopfront - Self-hosted storefront

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use tower_sessions::ExpiredDeletion;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopfront::config::Config;
use shopfront::middleware::session::{session_store, EXPIRED_SESSION_SWEEP};
use shopfront::services::{AuthService, EventPublisher};
use shopfront::state::AppState;
use shopfront::{db, routes};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config.database_url).await.context("Failed to open database")?;
    db::migrate(&pool).await.context("Failed to run migrations")?;

    let sweeper = session_store(&pool);
    tokio::spawn(async move {
        if let Err(e) = sweeper.continuously_delete_expired(EXPIRED_SESSION_SWEEP).await {
            tracing::error!(error = %e, "Expired session cleanup stopped");
        }
    });

    let events = match &config.nats_url {
        Some(url) => EventPublisher::connect(url).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "NATS unavailable, events will only be logged");
            EventPublisher::disabled()
        }),
        None => EventPublisher::disabled(),
    };

    if let Some(admin) = &config.admin {
        AuthService::new(&pool, &events)
            .ensure_admin(&admin.username, admin.password.expose_secret())
            .await
            .context("Failed to bootstrap admin account")?;
    }

    let addr = config.socket_addr();
    let app = routes::router(AppState::new(config, pool, events));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Shopfront listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
