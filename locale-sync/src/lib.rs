//! Core of the locale synchronizer
//!
//! Locale documents are nested JSON objects. This crate reads them into a
//! flat key-path form ([`codec`]), decides per key whether a target document
//! needs a fresh translation ([`classifier`]), and writes documents back in a
//! canonical, sorted layout so that repeated runs produce identical files.
//!
//! Obtaining translations is the job of the `locale-sync-mt` crate.

pub mod classifier;
pub mod codec;
pub mod document;
pub mod error;
pub mod language;
pub mod loader;
pub mod overrides;

// Re-export the types most callers need
pub use classifier::{Need, OverrideMode, classify, is_stale};
pub use codec::{FlatEntries, PATH_SEPARATOR, canonicalize, flatten, nest, to_canonical_json};
pub use document::LocaleDocument;
pub use error::{DocumentError, DocumentResult};
pub use language::display_name;
pub use loader::{LocaleSet, load_document, load_locale_set, load_override_document, write_document};
pub use overrides::OverrideMap;
