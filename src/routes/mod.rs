//! Rutas HTTP
//!
//! Un router por recurso, anidados bajo su prefijo en `create_router`.

pub mod audit_routes;
pub mod driver_routes;
pub mod trip_routes;
pub mod vehicle_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_middleware;
use crate::state::AppState;

/// Router completo de la aplicación con su estado
pub fn create_router(state: AppState) -> Router {
    let cors = cors_middleware(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/trips", trip_routes::create_trip_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/audit-logs", audit_routes::create_audit_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
