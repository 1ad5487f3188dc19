//! LaTeX escaping for free-form text fields.
//!
//! Escaping is a single linear scan: every special character is replaced by
//! literal replacement text that is never scanned again. This gives the same
//! result as applying the replacements in order with the backslash rule first,
//! without the risk of double-escaping the backslashes the later rules introduce.
//!
//! Escaping is NOT idempotent. Callers must escape exactly once.

/// Returns the LaTeX replacement for a special character, or `None` if the
/// character is safe to emit as-is.
fn replacement(c: char) -> Option<&'static str> {
    match c {
        '\\' => Some(r"\textbackslash{}"),
        '&' => Some(r"\&"),
        '%' => Some(r"\%"),
        '$' => Some(r"\$"),
        '#' => Some(r"\#"),
        '_' => Some(r"\_"),
        '{' => Some(r"\{"),
        '}' => Some(r"\}"),
        '~' => Some(r"\textasciitilde{}"),
        '^' => Some(r"\textasciicircum{}"),
        _ => None,
    }
}

/// Escapes `text` for use inside LaTeX body text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match replacement(c) {
            Some(rep) => out.push_str(rep),
            None => out.push(c),
        }
    }
    out
}

/// Escapes an optional field. Absent stays absent; an empty string stays empty.
pub fn escape_opt(text: Option<&str>) -> Option<String> {
    text.map(escape_latex)
}
