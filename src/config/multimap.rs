//! Insertion-ordered map from a key to every value assigned to it.

use std::collections::HashMap;

/// Ordered key → values map. Assigning an existing key appends instead of
/// overwriting, so repeated options in a configuration section stay
/// visible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl MultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `key`, creating the key if needed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1.push(value.into()),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value.into()]));
            }
        }
    }

    /// Merge another map into this one, appending values key by key.
    pub fn extend(&mut self, other: MultiMap) {
        for (key, values) in other.entries {
            for value in values {
                self.insert(key.clone(), value);
            }
        }
    }

    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.index
            .get(key)
            .map(|&i| self.entries[i].1.as_slice())
    }

    /// First value assigned to `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate keys in first-insertion order with all of their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_duplicates() {
        let mut map = MultiMap::new();
        map.insert("git", "latest");
        map.insert("cmake", "3.2");
        map.insert("git", "2.30");

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["git", "cmake"]);
        assert_eq!(map.get_all("git").unwrap(), ["latest", "2.30"]);
        assert_eq!(map.get("git"), Some("latest"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_extend_appends() {
        let mut first = MultiMap::new();
        first.insert("git", "latest");
        let mut second = MultiMap::new();
        second.insert("cmake", "3.2");
        second.insert("git", "2.30");

        first.extend(second);
        assert_eq!(first.get_all("git").unwrap(), ["latest", "2.30"]);
        assert_eq!(first.get("cmake"), Some("3.2"));
        assert!(first.contains_key("cmake"));
        assert!(!first.contains_key("make"));
    }

    #[test]
    fn test_empty() {
        let map = MultiMap::new();
        assert!(map.is_empty());
        assert_eq!(map.get("git"), None);
        assert_eq!(map.iter().count(), 0);
    }
}
