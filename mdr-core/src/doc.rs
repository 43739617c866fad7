//! Document model with Rope-based text storage

use anyhow::{Context, Result};
use ropey::Rope;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Scheme used for documents backed by a regular file
pub const FILE_SCHEME: &str = "file";

/// Stable identity for an open document.
///
/// The key form `scheme://path` is what the state table and config cache
/// use to address per-document entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentUri {
    scheme: String,
    path: PathBuf,
}

impl DocumentUri {
    /// Create a URI with an explicit scheme
    pub fn new(scheme: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            scheme: scheme.into(),
            path: path.into(),
        }
    }

    /// Create a file-scheme URI
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FILE_SCHEME, path)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical string key for table lookups
    pub fn to_key(&self) -> String {
        format!("{}://{}", self.scheme, self.path.display())
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path.display())
    }
}

/// An open document as the host presents it
#[derive(Clone)]
pub struct Document {
    pub uri: DocumentUri,
    pub language_id: String,
    pub rope: Rope,
}

impl Document {
    /// Load a document from a file path
    pub fn open(path: &Path) -> Result<Self> {
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", path.display()))?;

        let content = fs::read_to_string(&abs_path)
            .with_context(|| format!("Failed to read file: {}", abs_path.display()))?;

        let language_id = language_from_path(&abs_path).to_string();

        Ok(Self {
            uri: DocumentUri::file(abs_path),
            language_id,
            rope: Rope::from_str(&content),
        })
    }

    /// Build a document from text already held by the host
    pub fn in_memory(uri: DocumentUri, language_id: impl Into<String>, text: &str) -> Self {
        Self {
            uri,
            language_id: language_id.into(),
            rope: Rope::from_str(text),
        }
    }

    /// Get the number of lines in the document
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }
}

/// Infer the host language identifier from a file extension
pub fn language_from_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("md" | "markdown" | "mdown" | "mkd") => "markdown",
        _ => "plaintext",
    }
}
