use thiserror::Error;

use crate::render::value::BindingFailure;

/// Errors raised while parsing or evaluating a template.
///
/// Both variants are fatal for the render call: no output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template text itself is malformed (unbalanced or unknown markers).
    #[error("template syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A marker references a name the bound data does not define, or uses a
    /// value in a way its type does not allow.
    #[error("template binding error at line {line}: `{path}` {failure}")]
    Binding {
        line: usize,
        path: String,
        failure: BindingFailure,
    },
}

impl TemplateError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        TemplateError::Syntax {
            line,
            message: message.into(),
        }
    }
}
