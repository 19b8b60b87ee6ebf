//! Human-written descriptions keyed by element, attribute and attribute value.
//!
//! Keys look like `section`, `section[anchor]` and `section[numbered="false"]`.
//! A missing key is never an error.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Key → text lookup consulted by the catalog builder.
pub trait DescriptionLookup {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl DescriptionLookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl DescriptionLookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Lookup with nothing in it.
pub struct NoDescriptions;

impl DescriptionLookup for NoDescriptions {
    fn lookup(&self, _key: &str) -> Option<&str> {
        None
    }
}

/// In-memory description store. Later entries replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptions {
    entries: BTreeMap<String, String>,
}

impl Descriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut d = Self::new();
        d.extend(entries);
        d
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    pub fn extend<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in entries {
            self.insert(k, v);
        }
    }

    /// Merge another store into this one; its keys win.
    pub fn merge(&mut self, other: Descriptions) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DescriptionLookup for Descriptions {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

pub fn element_key(element: &str) -> String {
    element.to_string()
}

pub fn attribute_key(element: &str, attribute: &str) -> String {
    format!("{element}[{attribute}]")
}

pub fn choice_key(element: &str, attribute: &str, value: &str) -> String {
    format!("{element}[{attribute}=\"{value}\"]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys() {
        assert_eq!(element_key("section"), "section");
        assert_eq!(attribute_key("section", "anchor"), "section[anchor]");
        assert_eq!(
            choice_key("section", "numbered", "false"),
            "section[numbered=\"false\"]"
        );
    }

    #[test]
    fn missing_key_is_none() {
        let d = Descriptions::from_entries([("section", "A section.")]);
        assert_eq!(d.lookup("section"), Some("A section."));
        assert_eq!(d.lookup("section[anchor]"), None);
        assert_eq!(NoDescriptions.lookup("section"), None);
    }

    #[test]
    fn merge_prefers_newer_text() {
        let mut d = Descriptions::from_entries([("t", "old"), ("ul", "list")]);
        d.merge(Descriptions::from_entries([("t", "new")]));
        assert_eq!(d.lookup("t"), Some("new"));
        assert_eq!(d.lookup("ul"), Some("list"));
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn plain_maps_are_lookups() {
        let mut m: HashMap<String, String> = HashMap::new();
        m.insert("note".into(), "A note.".into());
        assert_eq!(m.lookup("note"), Some("A note."));
    }
}
