//! Template Store — named LaTeX templates per document kind.
//!
//! Built-in templates are compiled into the binary. Additional templates are
//! plain `.tex` files loaded from a directory at startup, named
//! `<kind>.<name>.tex` (e.g. `resume.compact.tex`). Everything is parsed once
//! during construction; afterwards the store is read-only and shared behind `Arc`.

pub mod handlers;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::DocumentKind;
use crate::render::engine::check_bindings;
use crate::render::{Template, TemplateError};

const BUILTIN_TEMPLATES: &[(DocumentKind, &str, &str)] = &[
    (
        DocumentKind::Resume,
        "default",
        include_str!("assets/resume.default.tex"),
    ),
    (
        DocumentKind::CoverLetter,
        "classic",
        include_str!("assets/cover_letter.classic.tex"),
    ),
    (
        DocumentKind::CoverLetter,
        "modern",
        include_str!("assets/cover_letter.modern.tex"),
    ),
];

/// Name of the template used when a caller does not pick one.
pub fn default_template_name(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Resume => "default",
        DocumentKind::CoverLetter => "classic",
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} template '{name}' is invalid: {source}")]
    Parse {
        kind: DocumentKind,
        name: String,
        #[source]
        source: TemplateError,
    },

    #[error("failed to read template path {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no {kind} template named '{name}'")]
pub struct TemplateNotFound {
    pub kind: DocumentKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub kind: DocumentKind,
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: BTreeMap<(DocumentKind, String), Template>,
}

impl TemplateStore {
    /// A store holding only the built-in templates.
    pub fn builtin() -> Result<Self, StoreError> {
        let mut store = TemplateStore::default();
        for (kind, name, source) in BUILTIN_TEMPLATES {
            store.insert(*kind, name, *source)?;
        }
        Ok(store)
    }

    /// Parses and adds a template, replacing any existing one with the same
    /// kind and name. Every field path must exist in the kind's schema.
    pub fn insert(
        &mut self,
        kind: DocumentKind,
        name: &str,
        source: impl Into<String>,
    ) -> Result<(), StoreError> {
        let template = Template::parse(name, source)
            .and_then(|t| check_bindings(&t, &kind.schema()).map(|()| t))
            .map_err(|source| StoreError::Parse {
                kind,
                name: name.to_string(),
                source,
            })?;
        if self
            .templates
            .insert((kind, name.to_string()), template)
            .is_some()
        {
            info!("Replaced {kind} template '{name}'");
        }
        Ok(())
    }

    /// Loads every `<kind>.<name>.tex` file in `dir`. Returns the number loaded.
    ///
    /// Files that do not follow the naming scheme are skipped with a warning;
    /// a file that fails to parse is an error.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, StoreError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_error(dir))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_error(dir))?;
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("tex") {
                continue;
            }
            let Some((kind, name)) = parse_file_stem(&path) else {
                warn!(
                    "Skipping template file {} (expected <kind>.<name>.tex)",
                    path.display()
                );
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(io_error(&path))?;
            self.insert(kind, &name, source)?;
            info!("Loaded {kind} template '{name}' from {}", path.display());
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn get(&self, kind: DocumentKind, name: &str) -> Result<&Template, TemplateNotFound> {
        self.templates
            .get(&(kind, name.to_string()))
            .ok_or_else(|| TemplateNotFound {
                kind,
                name: name.to_string(),
            })
    }

    pub fn default_for(&self, kind: DocumentKind) -> Result<&Template, TemplateNotFound> {
        self.get(kind, default_template_name(kind))
    }

    /// Looks up `name`, or the kind's default when no name is given.
    pub fn resolve(
        &self,
        kind: DocumentKind,
        name: Option<&str>,
    ) -> Result<&Template, TemplateNotFound> {
        match name {
            Some(name) => self.get(kind, name),
            None => self.default_for(kind),
        }
    }

    /// All templates, ordered by kind then name.
    pub fn list(&self) -> Vec<TemplateInfo> {
        self.templates
            .keys()
            .map(|(kind, name)| TemplateInfo {
                kind: *kind,
                name: name.clone(),
                is_default: name == default_template_name(*kind),
            })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.templates.len()
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

fn parse_file_stem(path: &Path) -> Option<(DocumentKind, String)> {
    let stem = path.file_stem()?.to_str()?;
    let (kind, name) = stem.split_once('.')?;
    let kind = kind.parse::<DocumentKind>().ok()?;
    if name.is_empty() {
        return None;
    }
    Some((kind, name.to_string()))
}
