use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::codec::{self, FlatEntries};
use crate::error::DocumentResult;
use crate::language;

/// One locale file, held in flattened form
///
/// `entries` maps key-paths (`menu/file`) to their string values.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleDocument {
    pub code: String,
    pub display_name: String,
    pub path: PathBuf,
    pub entries: FlatEntries,
}

impl LocaleDocument {
    /// Build a document from an already parsed JSON tree
    ///
    /// Fails when `code` has no known display name or the tree cannot be
    /// flattened.
    pub fn from_tree(code: &str, path: impl Into<PathBuf>, tree: &Value) -> DocumentResult<Self> {
        let display_name = language::display_name(code)?;
        let entries = codec::flatten(tree)?;
        Ok(LocaleDocument {
            code: code.to_string(),
            display_name,
            path: path.into(),
            entries,
        })
    }

    /// Build a document directly from flat entries
    pub fn with_entries(
        code: &str,
        path: impl Into<PathBuf>,
        entries: FlatEntries,
    ) -> DocumentResult<Self> {
        Ok(LocaleDocument {
            code: code.to_string(),
            display_name: language::display_name(code)?,
            path: path.into(),
            entries,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical JSON text of this document, as it is written to disk
    pub fn to_canonical_json(&self) -> DocumentResult<String> {
        codec::to_canonical_json(&self.entries)
    }
}
