use crate::codec::FlatEntries;

/// Pinned values that replace target entries without translation
///
/// Loaded once per run from a document of the same shape as any locale
/// file. The map is only ever read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideMap(FlatEntries);

impl OverrideMap {
    pub fn new(entries: FlatEntries) -> Self {
        OverrideMap(entries)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for OverrideMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        OverrideMap(iter.into_iter().collect())
    }
}
