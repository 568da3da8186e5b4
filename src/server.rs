//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and stream setup, background task
//! spawning, and Axum server lifecycle.

use crate::api::{middleware, routes};
use crate::application::services::{
    ClickConsumer, ClickPublisher, ClickSweeper, LinkService, RedirectTokenSigner,
};
use crate::config::Config;
use crate::infrastructure::cache::{LinkCache, NullCache, RedisLinkCache};
use crate::infrastructure::persistence::{PgClickStore, PgLinkStore};
use crate::infrastructure::stream::{self, NatsClickLog};
use crate::state::AppState;

use anyhow::Result;
use axum::{ServiceExt, extract::Request};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis cache with existence filter (or NullCache fallback)
/// - JetStream click log, durable consumer, and reconciliation sweeper
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database or stream connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let cache: Arc<dyn LinkCache> = if let Some(redis_url) = &config.redis_url {
        match RedisLinkCache::connect(
            redis_url,
            config.cache_ttl_seconds,
            config.negative_cache_ttl_seconds,
        )
        .await
        {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let jetstream = stream::connect(&config.nats_url).await?;
    tracing::info!("Connected to NATS JetStream");

    let pool = Arc::new(pool);
    let link_store = Arc::new(PgLinkStore::new(pool.clone()));
    let click_store = Arc::new(PgClickStore::new(pool.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let consumer = ClickConsumer::new(jetstream.clone(), click_store.clone(), shutdown_rx.clone());
    let consumer_handle = consumer.start().await?;

    let sweeper = ClickSweeper::new(
        click_store.clone(),
        Duration::from_secs(config.click_pending_ttl_seconds),
        Duration::from_secs(config.click_sweep_interval_seconds),
        shutdown_rx,
    );
    let sweeper_handle = sweeper.spawn();

    let state = AppState {
        links: Arc::new(LinkService::new(link_store, cache.clone())),
        clicks: click_store,
        publisher: Arc::new(ClickPublisher::new(Arc::new(NatsClickLog::new(jetstream)))),
        tokens: Arc::new(RedirectTokenSigner::new(
            config.redirect_token_secret.as_bytes(),
            Duration::from_secs(config.redirect_token_ttl_seconds),
        )),
        cache,
    };

    // Request IDs are assigned outside the trace layer so every span carries
    // one, and echoed back onto responses inside it.
    let app = routes::router()
        .layer(middleware::cors::layer())
        .layer(middleware::request_id::propagate_layer())
        .layer(middleware::tracing::layer())
        .layer(middleware::request_id::set_layer())
        .with_state(state);
    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop the consumer and sweeper, then give them a moment to finish the
    // batch they are working on.
    let _ = shutdown_tx.send(true);
    let _ = tokio::time::timeout(Duration::from_secs(10), async {
        let _ = consumer_handle.await;
        let _ = sweeper_handle.await;
    })
    .await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
