//! Typed document records parsed from the content-generation payload.
//!
//! Records are built fresh per request, escaped once into a new instance,
//! rendered, then dropped. Nothing here is shared or cached.

pub mod cover_letter;
pub mod resume;

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::render::value::Value;

/// The untyped input did not match the document schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed input: {0}")]
pub struct MalformedInputError(pub String);

impl MalformedInputError {
    pub fn new(message: impl Into<String>) -> Self {
        MalformedInputError(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }
}

impl DocumentKind {
    /// See [`Document::schema`].
    pub fn schema(&self) -> Value {
        match self {
            DocumentKind::Resume => resume::ResumeData::schema(),
            DocumentKind::CoverLetter => cover_letter::CoverLetterData::schema(),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(DocumentKind::Resume),
            "cover_letter" | "cover-letter" => Ok(DocumentKind::CoverLetter),
            other => Err(format!("unknown document kind `{other}`")),
        }
    }
}

/// A renderable document schema.
pub trait Document: Sized {
    const KIND: DocumentKind;

    /// Parses the untyped payload, applying defaults for optional fields.
    fn from_raw(raw: &serde_json::Value) -> Result<Self, MalformedInputError>;

    /// Returns a new record with every body-text field LaTeX-escaped.
    /// URL and email fields are copied through verbatim.
    fn escape_fields(&self) -> Self;

    /// The record as template bindings. Field names here are the names
    /// templates may reference.
    fn bindings(&self) -> Value;

    /// Bindings of a record with every optional field present and one
    /// element per sequence. Templates are checked against this shape so a
    /// misspelled field fails regardless of which branches the data reaches.
    fn schema() -> Value;

    fn escaped(&self) -> Escaped<Self> {
        Escaped(self.escape_fields())
    }
}

/// A document whose text fields have been escaped exactly once.
///
/// Only obtainable through [`Document::escaped`], so the renderer cannot be
/// handed unescaped data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaped<T>(T);

impl<T> Escaped<T> {
    pub fn get(&self) -> &T {
        &self.0
    }
}

fn json_type(raw: &serde_json::Value) -> &'static str {
    match raw {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Deserializes a top-level JSON object into `T`. Wrong types are rejected,
/// never coerced.
pub(crate) fn from_object<T: DeserializeOwned>(
    raw: &serde_json::Value,
    what: &str,
) -> Result<T, MalformedInputError> {
    if !raw.is_object() {
        return Err(MalformedInputError::new(format!(
            "{what} must be a JSON object, got {}",
            json_type(raw)
        )));
    }
    T::deserialize(raw).map_err(|e| MalformedInputError::new(format!("{what}: {e}")))
}

/// Treats an explicit `null` like a missing key for fields that default.
/// Pair with `#[serde(default)]` so the key may also be left out.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), MalformedInputError> {
    if value.trim().is_empty() {
        return Err(MalformedInputError::new(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_round_trip_names() {
        for kind in [DocumentKind::Resume, DocumentKind::CoverLetter] {
            assert_eq!(kind.as_str().parse::<DocumentKind>().unwrap(), kind);
        }
        assert_eq!(
            "cover-letter".parse::<DocumentKind>().unwrap(),
            DocumentKind::CoverLetter
        );
        assert!("invoice".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_document_kind_serde() {
        assert_eq!(
            serde_json::to_string(&DocumentKind::CoverLetter).unwrap(),
            "\"cover_letter\""
        );
    }

    #[test]
    fn test_from_object_rejects_non_object() {
        let err = from_object::<resume::Skills>(&serde_json::json!([1, 2]), "skills").unwrap_err();
        assert!(err.0.contains("must be a JSON object, got array"));
    }
}
