// Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::time::Instant;

use crate::app::AppState;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let start = Instant::now();
    let storage = state.store.health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (healthy, storage_health) = match storage {
        Ok(()) => (
            true,
            json!({
                "backend": state.store.backend_name(),
                "status": "healthy",
                "latency_ms": latency_ms,
                "error": null
            }),
        ),
        Err(e) => {
            tracing::error!("Storage health check failed: {}", e);
            (
                false,
                json!({
                    "backend": state.store.backend_name(),
                    "status": "unhealthy",
                    "latency_ms": latency_ms,
                    "error": e.to_string()
                }),
            )
        },
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "marketplace-backend",
        "environment": state.config.environment.to_string(),
        "email_delivery": if state.email.is_dry_run() { "dry_run" } else { "enabled" },
        "timestamp": timestamp,
        "components": {
            "storage": storage_health
        }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
