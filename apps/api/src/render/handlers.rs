//! Axum route handlers for the Render API.
//!
//! The request body carries the decoded payload from the content-generation
//! service. Rendering is fast and linear in input size, so it runs inline.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::cover_letter::CoverLetterData;
use crate::models::resume::ResumeData;
use crate::models::Document;
use crate::render::Renderer;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// Untyped document payload, validated against the schema on parse.
    pub data: serde_json::Value,
    /// Name of a stored template. Defaults to the kind's default.
    #[serde(default)]
    pub template_name: Option<String>,
    /// Caller-supplied template text. Takes precedence over `template_name`.
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub latex: String,
    /// The stored template name used, or `custom`.
    pub template: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// Parse → escape → render for one document kind.
pub fn render_document<D: Document>(
    renderer: &Renderer,
    request: RenderRequest,
) -> Result<RenderResponse, AppError> {
    let document = D::from_raw(&request.data)?;
    let escaped = document.escaped();

    let (latex, template) = match request.template {
        Some(source) => (
            renderer.render_source(&source, &escaped)?,
            "custom".to_string(),
        ),
        None => {
            let template = renderer
                .store()
                .resolve(D::KIND, request.template_name.as_deref())?;
            (
                renderer.render(template, &escaped)?,
                template.name().to_string(),
            )
        }
    };

    info!(
        "Rendered {} with template '{}' ({} bytes)",
        D::KIND,
        template,
        latex.len()
    );
    Ok(RenderResponse { latex, template })
}

/// POST /api/v1/render/resume
pub async fn handle_render_resume(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    render_document::<ResumeData>(&state.renderer, request).map(Json)
}

/// POST /api/v1/render/cover-letter
pub async fn handle_render_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    render_document::<CoverLetterData>(&state.renderer, request).map(Json)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
