pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::render::handlers as render;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/config-check", get(health::config_check_handler))
        // Template API
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route(
            "/api/v1/templates/:kind",
            get(templates::handle_get_template),
        )
        // Render API
        .route("/api/v1/render/resume", post(render::handle_render_resume))
        .route(
            "/api/v1/render/cover-letter",
            post(render::handle_render_cover_letter),
        )
        .with_state(state)
}
