use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "latexgen-api"
    }))
}

/// GET /config-check
/// Reports how the running instance was configured, without exposing values.
pub async fn config_check_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "template_dir_configured": state.config.template_dir.is_some(),
        "cors_restricted": !state.config.cors_allowed_origins.is_empty(),
        "templates_loaded": state.renderer.store().len()
    }))
}
