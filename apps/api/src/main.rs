mod config;
mod errors;
mod models;
mod render;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::render::Renderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::TemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LaTeX render API v{}", env!("CARGO_PKG_VERSION"));

    // Templates are parsed once here and never mutated afterwards.
    let store = load_templates(&config)?;
    info!("Template store ready ({} templates)", store.len());

    let state = AppState {
        config: config.clone(),
        renderer: Renderer::new(Arc::new(store)),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors(&config)?),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Built-in templates plus any from `TEMPLATE_DIR`. A template that fails to
/// parse aborts startup.
fn load_templates(config: &Config) -> Result<TemplateStore> {
    let mut store = TemplateStore::builtin().context("Built-in templates failed to load")?;
    if let Some(dir) = &config.template_dir {
        let loaded = store
            .load_dir(dir)
            .with_context(|| format!("Failed to load templates from {}", dir.display()))?;
        info!("Loaded {loaded} templates from {}", dir.display());
    }
    Ok(store)
}

/// Permissive CORS unless `CORS_ALLOWED_ORIGINS` names specific origins.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    if config.cors_allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
