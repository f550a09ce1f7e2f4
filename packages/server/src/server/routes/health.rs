use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use crate::server::app::AppState;

/// Liveness probe.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "trustedDomains": state.registry.len(),
    }))
}
