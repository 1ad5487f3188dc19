use crate::config::Config;
use crate::render::Renderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Holds the read-only template store loaded at startup.
    pub renderer: Renderer,
}
