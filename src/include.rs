//! Loading the documents named by `@include` directives.

use log::trace;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// A document fetched for an `@include`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedSource {
    /// The name errors and [`Setting::source_file`](crate::Setting::source_file) report.
    pub name: String,
    pub text: String,
}

/// Finds the text of an included document.
pub trait IncludeResolver: Send + Sync + fmt::Debug {
    /// `path` is the string literal after `@include`.
    fn resolve(&self, path: &str) -> io::Result<IncludedSource>;
}

/// Reads includes from disk. Relative paths are taken relative to `base_dir`.
#[derive(Debug, Clone)]
pub struct FsIncludeResolver {
    base_dir: PathBuf,
}

impl FsIncludeResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FsIncludeResolver {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl IncludeResolver for FsIncludeResolver {
    fn resolve(&self, path: &str) -> io::Result<IncludedSource> {
        let requested = Path::new(path);
        let full_path = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.base_dir.join(requested)
        };
        trace!("reading include {}", full_path.display());
        let text = std::fs::read_to_string(&full_path)?;
        Ok(IncludedSource {
            name: full_path.to_string_lossy().to_string(),
            text,
        })
    }
}

/// Serves includes from memory, keyed by the exact include path.
#[derive(Debug, Clone, Default)]
pub struct MemoryIncludeResolver {
    documents: HashMap<String, String>,
}

impl MemoryIncludeResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(path.into(), text.into());
        self
    }
}

impl IncludeResolver for MemoryIncludeResolver {
    fn resolve(&self, path: &str) -> io::Result<IncludedSource> {
        trace!("looking up in-memory include {path}");
        self.documents
            .get(path)
            .map(|text| IncludedSource {
                name: path.to_string(),
                text: text.clone(),
            })
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no document named '{path}'")))
    }
}
