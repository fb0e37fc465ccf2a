use anyhow::Context;
use oasis_api::{app, AppState, AuthConfig};
use oasis_store::{app_config::Config, DbClient, PgBookingRepository, PgCabinRepository, PgGuestRepository, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oasis_api=debug,oasis_core=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Oasis API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    // Redis: page cache and signed-out sessions
    let redis = Arc::new(
        RedisClient::new(&config.redis.url, config.cache.page_ttl_seconds)
            .await
            .context("Failed to connect to Redis")?,
    );

    let app_state = AppState::new(
        Arc::new(PgCabinRepository::new(db.pool.clone())),
        Arc::new(PgGuestRepository::new(db.pool.clone())),
        Arc::new(PgBookingRepository::new(db.pool.clone())),
        redis.clone(),
        redis,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            provider_secret: config.auth.provider_secret.clone(),
            expiration: config.auth.session_seconds,
            secure_cookie: config.auth.secure_cookie,
        },
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
