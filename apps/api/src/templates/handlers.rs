//! Axum route handlers for browsing the template store.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::DocumentKind;
use crate::state::AppState;
use crate::templates::TemplateInfo;

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template_type: DocumentKind,
    pub name: String,
    pub content: String,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<Vec<TemplateInfo>> {
    Json(state.renderer.store().list())
}

/// GET /api/v1/templates/:kind
///
/// Returns the raw template text (markers included) so callers can base a
/// custom template on it. Defaults to the kind's default template.
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<TemplateResponse>, AppError> {
    let kind: DocumentKind = kind.parse().map_err(AppError::NotFound)?;
    let template = state.renderer.store().resolve(kind, query.name.as_deref())?;

    Ok(Json(TemplateResponse {
        template_type: kind,
        name: template.name().to_string(),
        content: template.source().to_string(),
    }))
}
