//! Insertion-ordered, string-keyed mapping shared by the canonical tree and
//! the runtime value model.
//!
//! Equality ignores key order: two mappings are equal when they hold the same
//! key set and every key maps to equal values. Iteration and serialization
//! follow insertion order.

use indexmap::map::Entry;
use indexmap::IndexMap;

/// A string-keyed mapping that remembers insertion order.
#[derive(Debug, Clone)]
pub struct Mapping<V> {
    entries: IndexMap<String, V>,
}

impl<V> Mapping<V> {
    pub fn new() -> Self {
        Mapping {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Mapping {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value. Overwriting an existing key keeps its original position
    /// and returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    /// The value under `key`, inserting `default()` at the end first if absent.
    pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> V) -> &mut V {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Remove `key`, shifting later entries down so the order is kept.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys present in `self` but absent from `other`, in insertion order.
    pub fn keys_missing_from<'a, W>(&'a self, other: &'a Mapping<W>) -> Vec<&'a str> {
        self.keys().filter(|k| !other.contains_key(k)).collect()
    }

    /// True when both mappings hold exactly the same key set.
    pub fn same_keys<W>(&self, other: &Mapping<W>) -> bool {
        self.len() == other.len() && self.keys().all(|k| other.contains_key(k))
    }
}

impl<V> Default for Mapping<V> {
    fn default() -> Self {
        Mapping::new()
    }
}

impl<V: PartialEq> PartialEq for Mapping<V> {
    fn eq(&self, other: &Self) -> bool {
        self.same_keys(other) && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Mapping<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl<V> IntoIterator for Mapping<V> {
    type Item = (String, V);
    type IntoIter = indexmap::map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrite_keeps_position() {
        let mut m = Mapping::new();
        m.insert("a", 1);
        m.insert("b", 2);
        assert_eq!(m.insert("a", 3), Some(1));
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(m.get("a"), Some(&3));
    }

    #[test]
    fn test_equality_ignores_order() {
        let left: Mapping<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let right: Mapping<i32> = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_equality_requires_same_keys() {
        let left: Mapping<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let right: Mapping<i32> = [("a", 1), ("c", 2)].into_iter().collect();
        assert_ne!(left, right);
        assert_eq!(left.keys_missing_from(&right), vec!["b"]);
        assert_eq!(right.keys_missing_from(&left), vec!["c"]);
    }

    #[test]
    fn test_wide_mapping() {
        let wide: Mapping<usize> = (0..50_000).map(|i| (format!("k{}", i), i)).collect();
        let shuffled: Mapping<usize> = (0..50_000).rev().map(|i| (format!("k{}", i), i)).collect();
        assert_eq!(wide.get("k49999"), Some(&49_999));
        assert_eq!(wide.keys().next(), Some("k0"));
        assert!(wide.same_keys(&shuffled));
        assert_eq!(wide, shuffled);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut m: Mapping<i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(m.remove("a"), Some(1));
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_remove() {
        let mut m: Mapping<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(m.remove("a"), Some(1));
        assert_eq!(m.remove("a"), None);
        assert_eq!(m.len(), 1);
    }
}
