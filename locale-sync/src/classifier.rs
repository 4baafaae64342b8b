//! Decides, per key, what a synchronization pass does with a target entry
//!
//! A target value is considered stale (untranslated) when it is missing,
//! empty, a case-insensitive copy of the source text, or starts with the
//! `!` marker that translators leave on entries needing attention.
//! Overrides pin a value and always win over staleness.

use crate::overrides::OverrideMap;

/// Prefix marking an entry that must be translated again
pub const NEEDS_ATTENTION_MARKER: char = '!';

/// How a supplied override document interacts with staleness checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverrideMode {
    /// Supplying overrides switches staleness checks off for every key that
    /// already exists in the target
    #[default]
    Global,
    /// Only keys present in the override map bypass staleness checks
    PerKey,
}

/// Outcome of classifying one source key against a target document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Need<'a> {
    /// Source value is empty; nothing to do, nothing is written
    Skip,
    /// The target entry must be (re)translated from the source value
    Translate,
    /// The target entry is replaced by this pinned value
    Override(&'a str),
    /// The target entry keeps its current value
    Keep,
}

/// Classify one source entry against the target's current value
///
/// `target` is `None` when the target document has no entry for the key.
pub fn classify<'a>(
    source: &str,
    target: Option<&str>,
    key: &str,
    overrides: Option<&'a OverrideMap>,
    mode: OverrideMode,
) -> Need<'a> {
    if source.is_empty() {
        return Need::Skip;
    }

    let Some(current) = target else {
        return Need::Translate;
    };

    if let Some(overrides) = overrides {
        if let Some(pinned) = overrides.get(key) {
            return Need::Override(pinned);
        }
        if mode == OverrideMode::Global {
            return Need::Keep;
        }
    }

    if is_stale(source, current) {
        Need::Translate
    } else {
        Need::Keep
    }
}

/// Whether `current` looks like an untranslated copy of `source`
///
/// Copies are compared under simple case folding, one character at a time,
/// so `ΟΔΟΣ` matches `οδοσ` and `οδος` but `Straße` does not match `strasse`.
pub fn is_stale(source: &str, current: &str) -> bool {
    current.is_empty()
        || current.starts_with(NEEDS_ATTENTION_MARKER)
        || current.chars().map(fold_case).eq(source.chars().map(fold_case))
}

/// Map a character to a representative of its case orbit
///
/// Going through the upper case first joins variants such as final sigma
/// or long s with their plain lower case form. Characters whose case mapping
/// expands to several characters stay as they are.
fn fold_case(c: char) -> char {
    let upper = single_char(c.to_uppercase()).unwrap_or(c);
    single_char(upper.to_lowercase()).unwrap_or(upper)
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}
