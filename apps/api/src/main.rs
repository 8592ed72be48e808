mod auth;
mod cache;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod programs;
mod recommendations;
mod riasec;
mod routes;
mod seed;
mod state;
mod student;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{DisabledCache, RedisSessionCache, SessionCache};
use crate::catalog::UniversityCatalog;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} v{}", config::APP_NAME, env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    if config.seed_on_startup {
        seed::run(&db).await?;
    }

    // Initialize Redis; the API keeps serving without it
    let cache: Arc<dyn SessionCache> = match RedisSessionCache::connect(&config.redis_url).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!("Redis unavailable, token storage and login throttling disabled: {e:#}");
            Arc::new(DisabledCache)
        }
    };

    let catalog = Arc::new(UniversityCatalog::embedded()?);
    info!(
        establishments = catalog.establishments.len(),
        "University catalog loaded"
    );

    let cors = cors_layer(&config.cors_origins);

    // Build app state
    let state = AppState {
        db,
        cache,
        config: config.clone(),
        catalog,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Credentialed CORS restricted to the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}
