//! Attribute bags (spec §3 "Attributes"): unordered `string -> string` maps
//! with no duplicate keys. `BTreeMap` gives us that plus a stable iteration
//! order for free, which the selector and hashing code both lean on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Deep-copied on construction and on every accessor that would otherwise
/// hand out a mutable alias, so a caller holding an `Attributes` can never
/// observe a mutation made through another handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_copy_on_adoption_prevents_aliasing() {
        let mut original = Attributes::from_pairs([("service.name", "svc")]);
        let adopted = original.clone();
        original.insert("service.name", "changed");
        assert_eq!(adopted.get("service.name"), Some("svc"));
    }

    #[test]
    fn no_duplicate_keys() {
        let attrs = Attributes::from_pairs([("a", "1"), ("a", "2")]);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("a"), Some("2"));
    }
}
