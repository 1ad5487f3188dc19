// LaTeX rendering pipeline.
// Escaped document bindings + parsed template -> LaTeX source. Pure and synchronous.

pub mod engine;
pub mod error;
pub mod escape;
pub mod handlers;
pub mod template;
pub mod value;

pub use engine::Renderer;
pub use error::TemplateError;
pub use template::Template;
