//! Template evaluation against escaped document bindings.

use std::sync::Arc;

use tracing::debug;

use crate::models::{Document, Escaped};
use crate::render::error::TemplateError;
use crate::render::template::{FieldPath, Node, Template};
use crate::render::value::{BindingFailure, Scope, Value};
use crate::templates::TemplateStore;

/// Renders templates from an injected, read-only template store.
///
/// Cheap to clone; every render call is independent and side-effect free.
#[derive(Debug, Clone)]
pub struct Renderer {
    store: Arc<TemplateStore>,
}

impl Renderer {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Renders a parsed template with escaped document data.
    pub fn render<D: Document>(
        &self,
        template: &Template,
        data: &Escaped<D>,
    ) -> Result<String, TemplateError> {
        check_bindings(template, &D::schema())?;
        let bindings = data.get().bindings();
        let latex = render_value(template, &bindings)?;
        debug!(
            "Rendered {} template '{}' ({} bytes)",
            D::KIND,
            template.name(),
            latex.len()
        );
        Ok(latex)
    }

    /// Parses and renders a caller-supplied template string.
    pub fn render_source<D: Document>(
        &self,
        source: &str,
        data: &Escaped<D>,
    ) -> Result<String, TemplateError> {
        let template = Template::parse("custom", source)?;
        self.render(&template, data)
    }
}

/// Evaluates `template` against a root record.
///
/// Output is accumulated privately and only returned if evaluation succeeds.
pub fn render_value(template: &Template, root: &Value) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.source().len());
    eval(template.nodes(), &Scope::root(root), &mut out)?;
    Ok(out)
}

/// Checks every path in `template` against a schema record, visiting both
/// branches of each conditional and each loop body once.
///
/// Loop variables are bound to the sequence's first element; an empty or
/// absent sequence binds them to `Absent`.
pub fn check_bindings(template: &Template, schema: &Value) -> Result<(), TemplateError> {
    check(template.nodes(), &Scope::root(schema))
}

fn check(nodes: &[Node], scope: &Scope<'_>) -> Result<(), TemplateError> {
    let absent = Value::Absent;
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Variable { path, line } => match resolve(scope, path, *line)? {
                Value::Str(_) | Value::Absent => {}
                other => {
                    return Err(binding_error(
                        path,
                        *line,
                        BindingFailure::NotPrintable(other.type_name()),
                    ))
                }
            },
            Node::If {
                path,
                line,
                then_branch,
                else_branch,
            } => {
                resolve(scope, path, *line)?;
                check(then_branch, scope)?;
                check(else_branch, scope)?;
            }
            Node::For {
                item,
                seq,
                line,
                body,
            } => {
                let element = match resolve(scope, seq, *line)? {
                    Value::Seq(items) => items.first().unwrap_or(&absent),
                    Value::Absent => &absent,
                    other => {
                        return Err(binding_error(
                            seq,
                            *line,
                            BindingFailure::NotIterable(other.type_name()),
                        ))
                    }
                };
                check(body, &scope.bind(item, element))?;
            }
        }
    }
    Ok(())
}

fn resolve<'a>(
    scope: &Scope<'a>,
    path: &FieldPath,
    line: usize,
) -> Result<&'a Value, TemplateError> {
    scope
        .lookup(path.segments())
        .map_err(|failure| binding_error(path, line, failure))
}

fn binding_error(path: &FieldPath, line: usize, failure: BindingFailure) -> TemplateError {
    TemplateError::Binding {
        line,
        path: path.to_string(),
        failure,
    }
}

fn eval(nodes: &[Node], scope: &Scope<'_>, out: &mut String) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Variable { path, line } => match resolve(scope, path, *line)? {
                Value::Str(s) => out.push_str(s),
                Value::Absent => {}
                other => {
                    return Err(binding_error(
                        path,
                        *line,
                        BindingFailure::NotPrintable(other.type_name()),
                    ))
                }
            },
            Node::If {
                path,
                line,
                then_branch,
                else_branch,
            } => {
                let branch = if resolve(scope, path, *line)?.is_truthy() {
                    then_branch
                } else {
                    else_branch
                };
                eval(branch, scope, out)?;
            }
            Node::For {
                item,
                seq,
                line,
                body,
            } => match resolve(scope, seq, *line)? {
                Value::Seq(items) => {
                    for value in items {
                        let inner = scope.bind(item, value);
                        eval(body, &inner, out)?;
                    }
                }
                Value::Absent => {}
                other => {
                    return Err(binding_error(
                        seq,
                        *line,
                        BindingFailure::NotIterable(other.type_name()),
                    ))
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str, root: &Value) -> Result<String, TemplateError> {
        render_value(&Template::parse("test", src).unwrap(), root)
    }

    fn data() -> Value {
        Value::record([
            (
                "contact",
                Value::record([
                    ("name", Value::from("Ada")),
                    ("phone", Value::Absent),
                    ("email", Value::from("")),
                ]),
            ),
            (
                "experience",
                Value::Seq(vec![
                    Value::record([
                        ("company", Value::from("Engines Ltd")),
                        ("bullets", Value::strings(&["one", "two"])),
                    ]),
                    Value::record([
                        ("company", Value::from("Babbage & Co")),
                        ("bullets", Value::strings::<&str>(&[])),
                    ]),
                ]),
            ),
            ("education", Value::Seq(vec![])),
        ])
    }

    // ── substitution ────────────────────────────────────────────────────────

    #[test]
    fn test_literal_text_verbatim() {
        let src = r"\documentclass{article} % comment {braces} $x$";
        assert_eq!(render(src, &data()).unwrap(), src);
    }

    #[test]
    fn test_substitution() {
        assert_eq!(
            render(r"\textbf{<< contact.name >>}", &data()).unwrap(),
            r"\textbf{Ada}"
        );
    }

    #[test]
    fn test_absent_substitutes_empty() {
        assert_eq!(render("[<< contact.phone >>]", &data()).unwrap(), "[]");
    }

    #[test]
    fn test_unknown_field_is_binding_error() {
        let err = render("\n<< contact.fax >>", &data()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Binding {
                line: 2,
                path: "contact.fax".to_string(),
                failure: BindingFailure::UnknownField("fax".to_string()),
            }
        );
    }

    #[test]
    fn test_unknown_root_is_binding_error() {
        let err = render("<< summary >>", &data()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Binding {
                failure: BindingFailure::UnknownName,
                ..
            }
        ));
    }

    #[test]
    fn test_substituting_sequence_is_binding_error() {
        let err = render("<< experience >>", &data()).unwrap_err();
        assert!(err.to_string().contains("cannot be substituted"));
    }

    // ── conditionals ────────────────────────────────────────────────────────

    #[test]
    fn test_if_absent_renders_nothing() {
        assert_eq!(
            render("a<% if contact.phone %>P: << contact.phone >><% endif %>b", &data()).unwrap(),
            "ab"
        );
    }

    #[test]
    fn test_if_empty_string_renders_nothing() {
        assert_eq!(
            render("<% if contact.email %>mail<% endif %>", &data()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_if_present_renders_block() {
        assert_eq!(
            render("<% if contact.name %>Hi << contact.name >><% endif %>", &data()).unwrap(),
            "Hi Ada"
        );
    }

    #[test]
    fn test_else_branch() {
        assert_eq!(
            render(
                "Dear <% if contact.phone %><< contact.phone >><% else %>Hiring Manager<% endif %>,",
                &data()
            )
            .unwrap(),
            "Dear Hiring Manager,"
        );
    }

    #[test]
    fn test_if_on_sequence_checks_emptiness() {
        assert_eq!(
            render("<% if education %>E<% endif %><% if experience %>X<% endif %>", &data())
                .unwrap(),
            "X"
        );
    }

    #[test]
    fn test_if_unknown_field_is_binding_error() {
        assert!(render("<% if contact.fax %>x<% endif %>", &data()).is_err());
    }

    // ── iteration ───────────────────────────────────────────────────────────

    #[test]
    fn test_for_nested() {
        let src = "<% for exp in experience %>[<< exp.company >>:<% for b in exp.bullets %> << b >><% endfor %>]<% endfor %>";
        assert_eq!(
            render(src, &data()).unwrap(),
            "[Engines Ltd: one two][Babbage & Co:]"
        );
    }

    #[test]
    fn test_for_empty_sequence() {
        assert_eq!(
            render("before<% for e in education %>X<% endfor %>after", &data()).unwrap(),
            "beforeafter"
        );
    }

    #[test]
    fn test_for_over_absent_is_empty() {
        assert_eq!(
            render("<% for p in contact.phone %>X<% endfor %>", &data()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_for_over_string_is_binding_error() {
        let err = render("<% for c in contact.name %>X<% endfor %>", &data()).unwrap_err();
        assert!(err.to_string().contains("cannot be iterated"));
    }

    #[test]
    fn test_loop_variable_scoped_to_body() {
        let err = render(
            "<% for exp in experience %><% endfor %><< exp.company >>",
            &data(),
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::Binding { .. }));
    }

    #[test]
    fn test_loop_variable_shadows_root_name() {
        let src = "<% for contact in experience %><< contact.company >>;<% endfor %><< contact.name >>";
        assert_eq!(
            render(src, &data()).unwrap(),
            "Engines Ltd;Babbage & Co;Ada"
        );
    }

    // ── fail closed ─────────────────────────────────────────────────────────

    #[test]
    fn test_binding_error_after_output_returns_no_partial() {
        let result = render("lots of text << contact.name >> then << contact.fax >>", &data());
        assert!(result.is_err());
    }

    // ── static binding check ────────────────────────────────────────────────

    fn check_src(src: &str, root: &Value) -> Result<(), TemplateError> {
        check_bindings(&Template::parse("test", src).unwrap(), root)
    }

    #[test]
    fn test_check_visits_untaken_branches() {
        // Renders fine with this data, but the else branch names a missing field.
        let src = "<% if contact.name %>x<% else %><< contact.fax >><% endif %>";
        assert!(render(src, &data()).is_ok());
        let err = check_src(src, &data()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Binding { ref path, .. } if path == "contact.fax"
        ));
    }

    #[test]
    fn test_check_uses_first_element_for_loops() {
        let src = "<% for exp in experience %><% for b in exp.bullets %><< b >><% endfor %><< exp.compnay >><% endfor %>";
        let err = check_src(src, &data()).unwrap_err();
        assert!(err.to_string().contains("exp.compnay"));
        assert!(check_src(
            "<% for exp in experience %><< exp.company >><% endfor %>",
            &data()
        )
        .is_ok());
    }

    #[test]
    fn test_check_rejects_iterating_a_string() {
        assert!(check_src("<% for c in contact.name %><% endfor %>", &data()).is_err());
    }

    #[test]
    fn test_deterministic() {
        let src = "<% for exp in experience %><< exp.company >><% endfor %>";
        assert_eq!(render(src, &data()).unwrap(), render(src, &data()).unwrap());
    }
}
