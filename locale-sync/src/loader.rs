use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::codec;
use crate::document::LocaleDocument;
use crate::error::{DocumentError, DocumentResult};
use crate::overrides::OverrideMap;

/// A source document and the target documents found next to it
#[derive(Debug)]
pub struct LocaleSet {
    pub source: LocaleDocument,
    pub targets: Vec<LocaleDocument>,
    /// Files that looked like locale documents but could not be loaded
    pub skipped: Vec<(PathBuf, DocumentError)>,
}

fn read_tree(path: &Path) -> DocumentResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        DocumentError::MalformedDocument(format!(
            "failed to parse JSON from '{}': {}",
            path.display(),
            e
        ))
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load one locale document
///
/// The file must have a `.json` extension; its stem is the language code
/// (`locales/pt-BR.json` -> `pt-BR`).
///
/// # Errors
/// - Not a `.json` file, or invalid JSON / shape: `MalformedDocument`
/// - Unknown language code: `UnrecognizedLanguageCode`
/// - File read errors: `Io`
pub fn load_document(path: &Path) -> DocumentResult<LocaleDocument> {
    if !is_json(path) {
        return Err(DocumentError::MalformedDocument(format!(
            "'{}' is not a JSON file",
            path.display()
        )));
    }

    let code = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            DocumentError::MalformedDocument(format!("invalid file name: {}", path.display()))
        })?;

    let tree = read_tree(path)?;
    let document = LocaleDocument::from_tree(code, path, &tree)?;
    debug!(
        "Loaded {} ({}): {} entries",
        path.display(),
        document.display_name,
        document.len()
    );
    Ok(document)
}

/// Load the override document; its file name carries no language
pub fn load_override_document(path: &Path) -> DocumentResult<OverrideMap> {
    let tree = read_tree(path)?;
    Ok(OverrideMap::new(codec::flatten(&tree)?))
}

/// Load the source document and every other `*.json` file in `dir`
///
/// Targets are returned sorted by file name. A target that fails to load is
/// reported in [`LocaleSet::skipped`] and does not stop the others; any
/// failure on the source document is returned as an error.
pub fn load_locale_set(dir: &Path, source_file_name: &str) -> DocumentResult<LocaleSet> {
    let source = load_document(&dir.join(source_file_name))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| DocumentError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DocumentError::io(dir, e))?;
        let path = entry.path();

        if !path.is_file() || !is_json(&path) {
            continue;
        }
        let is_source = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case(source_file_name));
        if is_source {
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut targets = Vec::new();
    let mut skipped = Vec::new();
    for path in paths {
        match load_document(&path) {
            Ok(document) => targets.push(document),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped.push((path, e));
            }
        }
    }

    if targets.is_empty() {
        warn!("No target locale documents found in {}", dir.display());
    }

    Ok(LocaleSet {
        source,
        targets,
        skipped,
    })
}

/// Write a document as canonical JSON, replacing the file's content
///
/// The text goes to a temporary file in the same directory, which is then
/// renamed over the target. On any error the existing file is left as it was.
pub fn write_document(document: &LocaleDocument) -> DocumentResult<()> {
    let path = &document.path;
    let text = document.to_canonical_json()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| DocumentError::io(path, e))?;
    staged
        .write_all(text.as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| DocumentError::io(path, e))?;
    staged
        .persist(path)
        .map_err(|e| DocumentError::io(path, e.error))?;
    debug!("Wrote {}", path.display());
    Ok(())
}
