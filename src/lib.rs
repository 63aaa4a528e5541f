// Library exports for the marketplace backend
// This file exposes modules and functions for the binary and integration tests

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, StorageBackend, CONFIG};
pub use middleware::{auth_middleware, AdminUser, AuthenticatedUser};
pub use store::{MemoryStore, PgStore, SharedStore, Store};
pub use utils::service_error::{ServiceError, ServiceResult};

/// Opens the configured storage backend, applying embedded migrations for
/// postgres unless they are disabled.
pub async fn initialize_store(
    config: &AppConfig,
) -> Result<SharedStore, Box<dyn std::error::Error + Send + Sync>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        },
        StorageBackend::Postgres => {
            info!(
                "Initializing database pool for {}",
                db::mask_connection_string(&config.database.url)
            );

            if migrations::should_run_migrations(config) {
                migrations::run_all_migrations(migrations::MigrationConfig::from(config)).await?;
            } else {
                let status = migrations::diesel::check_migration_status(&config.database.url).await?;
                if !status.is_up_to_date() {
                    warn!(
                        "Embedded migrations are disabled and {} are pending: {:?}",
                        status.pending_count, status.pending_migrations
                    );
                }
            }

            let pool = db::create_diesel_pool(db::DieselDatabaseConfig::from(&config.database)).await?;
            Ok(Arc::new(PgStore::new(pool)))
        },
    }
}

/// Builds the state for the process-wide configuration
pub async fn initialize_app_state(
    config: &AppConfig,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store = initialize_store(config).await?;
    let state = AppState::new(store, Arc::new(config.clone()))?;
    info!("Application state initialized with {} storage", state.store.backend_name());
    Ok(state)
}

/// Wildcard origins reflect the caller's origin outside production; in
/// production only explicitly listed origins are allowed.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    let configured = &config.server.cors_allowed_origins;
    let has_wildcard = configured.iter().any(|origin| origin == "*");

    if has_wildcard && !config.is_production() {
        return base.allow_origin(AllowOrigin::mirror_request());
    }
    if has_wildcard {
        warn!("Ignoring wildcard CORS origin in production");
    }

    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            },
        })
        .collect();

    if origins.is_empty() {
        if config.is_production() {
            warn!("No CORS origins configured in production; cross-origin requests are refused");
            base
        } else {
            base.allow_origin(Any)
        }
    } else {
        base.allow_origin(origins)
    }
}

/// The full HTTP application: `/api` routes plus tracing and CORS layers
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api", handlers::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
