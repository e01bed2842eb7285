//! HTTP router configuration

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::{system, vms};
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // System endpoints
        .route("/health", get(system::health))
        .route("/api-docs/openapi.json", get(system::openapi))
        // VM endpoints
        .route("/api/vms", get(vms::list_vms))
        .route("/api/vms/{id}", get(vms::get_vm))
        .route("/api/vms/{id}/power/{action}", post(vms::power_vm))
        // State
        .with_state(state)
}
