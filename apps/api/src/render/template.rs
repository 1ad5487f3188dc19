//! Template grammar: tokenizer and block-tree builder.
//!
//! Marker delimiters are chosen so they never collide with LaTeX's own
//! `{}`/`\`/`%` conventions:
//!
//! ```text
//! << contact.name >>                      substitution
//! <% if skills.tools %> ... <% else %> ... <% endif %>
//! <% for exp in experience %> ... <% endfor %>
//! <# dropped before rendering #>
//! ```
//!
//! Parsing runs in two phases. `tokenize` produces a flat token stream; `build`
//! folds it into a block tree and rejects unbalanced markers. A `Template` only
//! exists once both phases succeed, so evaluation never sees bad syntax.

use std::fmt;

use crate::render::error::TemplateError;

pub const VARIABLE_START: &str = "<<";
pub const VARIABLE_END: &str = ">>";
pub const BLOCK_START: &str = "<%";
pub const BLOCK_END: &str = "%>";
pub const COMMENT_START: &str = "<#";
pub const COMMENT_END: &str = "#>";

// ────────────────────────────────────────────────────────────────────────────
// Field paths
// ────────────────────────────────────────────────────────────────────────────

/// A dotted field path such as `exp.bullets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    fn parse(raw: &str, line: usize) -> Result<Self, TemplateError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TemplateError::syntax(line, "empty field path"));
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if let Some(bad) = segments.iter().find(|s| !is_identifier(s)) {
            return Err(TemplateError::syntax(
                line,
                format!("invalid segment `{bad}` in field path `{raw}`"),
            ));
        }
        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ────────────────────────────────────────────────────────────────────────────
// Phase 1: flat token stream
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Variable { path: FieldPath, line: usize },
    If { path: FieldPath, line: usize },
    Else { line: usize },
    EndIf { line: usize },
    For { item: String, seq: FieldPath, line: usize },
    EndFor { line: usize },
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Variable,
    Block,
    Comment,
}

impl Marker {
    fn at(s: &str) -> Option<Marker> {
        if s.starts_with(VARIABLE_START) {
            Some(Marker::Variable)
        } else if s.starts_with(BLOCK_START) {
            Some(Marker::Block)
        } else if s.starts_with(COMMENT_START) {
            Some(Marker::Comment)
        } else {
            None
        }
    }

    fn open(self) -> &'static str {
        match self {
            Marker::Variable => VARIABLE_START,
            Marker::Block => BLOCK_START,
            Marker::Comment => COMMENT_START,
        }
    }

    fn close(self) -> &'static str {
        match self {
            Marker::Variable => VARIABLE_END,
            Marker::Block => BLOCK_END,
            Marker::Comment => COMMENT_END,
        }
    }
}

fn next_marker(s: &str) -> Option<(usize, Marker)> {
    s.match_indices('<')
        .find_map(|(i, _)| Marker::at(&s[i..]).map(|m| (i, m)))
}

fn count_lines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

/// Splits template source into a flat token stream.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1;

    while let Some((idx, marker)) = next_marker(rest) {
        let text = &rest[..idx];
        if !text.is_empty() {
            tokens.push(Token::Text(text.to_string()));
        }
        line += count_lines(text);

        let after = &rest[idx + marker.open().len()..];
        let end = after.find(marker.close()).ok_or_else(|| {
            TemplateError::syntax(
                line,
                format!("unterminated `{}` marker", marker.open()),
            )
        })?;
        let inner = &after[..end];

        tokens.push(match marker {
            Marker::Variable => Token::Variable {
                path: FieldPath::parse(inner, line)?,
                line,
            },
            Marker::Block => block_token(inner, line)?,
            Marker::Comment => Token::Comment,
        });

        line += count_lines(inner);
        rest = &after[end + marker.close().len()..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    Ok(tokens)
}

fn block_token(inner: &str, line: usize) -> Result<Token, TemplateError> {
    let words: Vec<&str> = inner.split_whitespace().collect();
    match words.as_slice() {
        ["if", path] => Ok(Token::If {
            path: FieldPath::parse(path, line)?,
            line,
        }),
        ["else"] => Ok(Token::Else { line }),
        ["endif"] => Ok(Token::EndIf { line }),
        ["for", item, "in", seq] => {
            if !is_identifier(item) {
                return Err(TemplateError::syntax(
                    line,
                    format!("invalid loop variable `{item}`"),
                ));
            }
            Ok(Token::For {
                item: item.to_string(),
                seq: FieldPath::parse(seq, line)?,
                line,
            })
        }
        ["endfor"] => Ok(Token::EndFor { line }),
        [] => Err(TemplateError::syntax(line, "empty block marker")),
        ["if", ..] => Err(TemplateError::syntax(
            line,
            "`if` expects exactly one field path",
        )),
        ["for", ..] => Err(TemplateError::syntax(
            line,
            "`for` expects `for <name> in <field path>`",
        )),
        [keyword, ..] => Err(TemplateError::syntax(
            line,
            format!("unknown block keyword `{keyword}`"),
        )),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Phase 2: block tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Variable {
        path: FieldPath,
        line: usize,
    },
    If {
        path: FieldPath,
        line: usize,
        then_branch: Vec<Node>,
        else_branch: Vec<Node>,
    },
    For {
        item: String,
        seq: FieldPath,
        line: usize,
        body: Vec<Node>,
    },
}

/// An open block while building the tree.
enum Open {
    If {
        path: FieldPath,
        line: usize,
        then_branch: Vec<Node>,
        else_branch: Option<Vec<Node>>,
    },
    For {
        item: String,
        seq: FieldPath,
        line: usize,
        body: Vec<Node>,
    },
}

impl Open {
    fn describe(&self) -> String {
        match self {
            Open::If { line, .. } => format!("`if` opened at line {line}"),
            Open::For { line, .. } => format!("`for` opened at line {line}"),
        }
    }

    fn children(&mut self) -> &mut Vec<Node> {
        match self {
            Open::If {
                else_branch: Some(nodes),
                ..
            } => nodes,
            Open::If { then_branch, .. } => then_branch,
            Open::For { body, .. } => body,
        }
    }
}

/// Folds a flat token stream into a block tree, checking that every block
/// marker is balanced.
pub fn build(tokens: Vec<Token>) -> Result<Vec<Node>, TemplateError> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Open> = Vec::new();

    for token in tokens {
        let node = match token {
            Token::Comment => continue,
            Token::Text(text) => Node::Text(text),
            Token::Variable { path, line } => Node::Variable { path, line },
            Token::If { path, line } => {
                stack.push(Open::If {
                    path,
                    line,
                    then_branch: Vec::new(),
                    else_branch: None,
                });
                continue;
            }
            Token::For { item, seq, line } => {
                stack.push(Open::For {
                    item,
                    seq,
                    line,
                    body: Vec::new(),
                });
                continue;
            }
            Token::Else { line } => {
                match stack.last_mut() {
                    Some(Open::If { else_branch, .. }) if else_branch.is_none() => {
                        *else_branch = Some(Vec::new());
                    }
                    Some(Open::If { .. }) => {
                        return Err(TemplateError::syntax(line, "duplicate `else` in `if` block"));
                    }
                    Some(open) => {
                        return Err(TemplateError::syntax(
                            line,
                            format!("`else` inside {}", open.describe()),
                        ));
                    }
                    None => {
                        return Err(TemplateError::syntax(line, "`else` without matching `if`"));
                    }
                }
                continue;
            }
            Token::EndIf { line } => match stack.pop() {
                Some(Open::If {
                    path,
                    line: open_line,
                    then_branch,
                    else_branch,
                }) => Node::If {
                    path,
                    line: open_line,
                    then_branch,
                    else_branch: else_branch.unwrap_or_default(),
                },
                Some(open) => {
                    return Err(TemplateError::syntax(
                        line,
                        format!("`endif` closes {}", open.describe()),
                    ));
                }
                None => {
                    return Err(TemplateError::syntax(line, "`endif` without matching `if`"));
                }
            },
            Token::EndFor { line } => match stack.pop() {
                Some(Open::For {
                    item,
                    seq,
                    line: open_line,
                    body,
                }) => Node::For {
                    item,
                    seq,
                    line: open_line,
                    body,
                },
                Some(open) => {
                    return Err(TemplateError::syntax(
                        line,
                        format!("`endfor` closes {}", open.describe()),
                    ));
                }
                None => {
                    return Err(TemplateError::syntax(line, "`endfor` without matching `for`"));
                }
            },
        };

        match stack.last_mut() {
            Some(open) => open.children().push(node),
            None => root.push(node),
        }
    }

    if let Some(open) = stack.pop() {
        let line = match &open {
            Open::If { line, .. } | Open::For { line, .. } => *line,
        };
        return Err(TemplateError::syntax(
            line,
            format!("unclosed block: {}", open.describe()),
        ));
    }

    Ok(root)
}

// ────────────────────────────────────────────────────────────────────────────
// Template
// ────────────────────────────────────────────────────────────────────────────

/// A named, fully parsed template. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parses `source`. Fails with `TemplateError::Syntax` on malformed markers.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let nodes = build(tokenize(&source)?)?;
        Ok(Template {
            name: name.into(),
            source,
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original template text, markers included.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}
