//! The uniform value model templates are evaluated against, and the scope
//! chain used for dotted-path lookup.

use std::collections::BTreeMap;

use thiserror::Error;

/// A bound template value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Seq(Vec<Value>),
    Record(BTreeMap<String, Value>),
    /// An optional field with no value. Renders as empty text and is falsy.
    Absent,
}

/// Why a path could not be resolved against the bound data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingFailure {
    #[error("is not defined")]
    UnknownName,
    #[error("has no field `{0}`")]
    UnknownField(String),
    #[error("cannot be indexed by `{0}` (not a record)")]
    NotARecord(String),
    #[error("is a {0} and cannot be substituted as text")]
    NotPrintable(&'static str),
    #[error("is a {0} and cannot be iterated")]
    NotIterable(&'static str),
}

impl Value {
    /// Builds a record from `(field, value)` pairs.
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a sequence of strings.
    pub fn strings<S: AsRef<str>>(items: &[S]) -> Self {
        Value::Seq(items.iter().map(|s| Value::from(s.as_ref())).collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Record(_) => "record",
            Value::Absent => "absent value",
        }
    }

    /// Conditional truthiness: absent and empty values are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Seq(items) => !items.is_empty(),
            Value::Record(_) => true,
            Value::Absent => false,
        }
    }

    /// Descends through `fields` starting at this value.
    ///
    /// Descending through `Absent` yields `Absent`, so optional nested data
    /// reads as empty rather than failing.
    pub fn get_path<S: AsRef<str>>(&self, fields: &[S]) -> Result<&Value, BindingFailure> {
        let Some((head, rest)) = fields.split_first() else {
            return Ok(self);
        };
        let head = head.as_ref();
        match self {
            Value::Record(map) => map
                .get(head)
                .ok_or_else(|| BindingFailure::UnknownField(head.to_string()))?
                .get_path(rest),
            Value::Absent => Ok(self),
            _ => Err(BindingFailure::NotARecord(head.to_string())),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::Absent, Value::Str)
    }
}

impl From<&Option<String>> for Value {
    fn from(s: &Option<String>) -> Self {
        s.as_deref().map_or(Value::Absent, Value::from)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scope chain
// ────────────────────────────────────────────────────────────────────────────

/// Name bindings visible during rendering, innermost loop binding first.
#[derive(Debug)]
pub enum Scope<'a> {
    /// The top-level record. Its fields are the root names.
    Root(&'a Value),
    /// A loop variable layered over an enclosing scope.
    Frame {
        name: &'a str,
        value: &'a Value,
        parent: &'a Scope<'a>,
    },
}

impl<'a> Scope<'a> {
    pub fn root(value: &'a Value) -> Self {
        Scope::Root(value)
    }

    /// Returns a child scope binding `name` to `value`, shadowing any outer `name`.
    pub fn bind<'b>(&'b self, name: &'b str, value: &'b Value) -> Scope<'b> {
        Scope::Frame {
            name,
            value,
            parent: self,
        }
    }

    /// Resolves a dotted path given as segments. The first segment is looked up
    /// innermost scope first; the rest descend into the found value.
    pub fn lookup<S: AsRef<str>>(&self, segments: &[S]) -> Result<&'a Value, BindingFailure> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(BindingFailure::UnknownName);
        };
        let head = head.as_ref();
        let mut scope = self;
        loop {
            match scope {
                Scope::Frame {
                    name,
                    value,
                    parent,
                } => {
                    if *name == head {
                        return value.get_path(rest);
                    }
                    scope = *parent;
                }
                Scope::Root(root) => {
                    let Value::Record(map) = *root else {
                        return Err(BindingFailure::UnknownName);
                    };
                    return map
                        .get(head)
                        .ok_or(BindingFailure::UnknownName)?
                        .get_path(rest);
                }
            }
        }
    }
}
