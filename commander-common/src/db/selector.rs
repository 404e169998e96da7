//! Attribute-based selectors (spec §4.6, §9 "selector"). A selector is an AND
//! of identifying and non-identifying key/value predicates; empty maps match
//! everything. The shape is generic so both the sorted-key (client-side
//! filter) and document (`$elemMatch` query) bindings share one definition,
//! and `commander-core`'s `AgentGroup` reuses it verbatim as its selector
//! field type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(default)]
    pub identifying: BTreeMap<String, String>,
    #[serde(default)]
    pub non_identifying: BTreeMap<String, String>,
}

impl Selector {
    pub fn is_empty(&self) -> bool {
        self.identifying.is_empty() && self.non_identifying.is_empty()
    }

    /// Does `identifying`/`non_identifying` (the agent's own attribute maps)
    /// satisfy this selector? Every pair in the selector must be present with
    /// an equal value in the corresponding map; an empty selector map matches
    /// unconditionally.
    pub fn matches(
        &self,
        identifying: &BTreeMap<String, String>,
        non_identifying: &BTreeMap<String, String>,
    ) -> bool {
        subset_matches(&self.identifying, identifying)
            && subset_matches(&self.non_identifying, non_identifying)
    }
}

fn subset_matches(selector: &BTreeMap<String, String>, actual: &BTreeMap<String, String>) -> bool {
    selector
        .iter()
        .all(|(k, v)| actual.get(k).is_some_and(|actual_v| actual_v == v))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_selector_matches_all() {
        let selector = Selector::default();
        assert!(selector.matches(&map(&[("a", "1")]), &map(&[])));
        assert!(selector.matches(&map(&[]), &map(&[])));
    }

    /// One identifying-attribute selector against several candidate agent
    /// attribute maps (spec §4.6 "every pair in the selector must be
    /// present with an equal value").
    #[rstest]
    #[case(&[("service.name", "s1"), ("host", "h1")], true)]
    #[case(&[("service.name", "s1")], true)]
    #[case(&[("service.name", "s2")], false)]
    #[case(&[], false)]
    fn requires_every_pair_to_match(#[case] actual: &[(&str, &str)], #[case] expected: bool) {
        let selector = Selector {
            identifying: map(&[("service.name", "s1")]),
            non_identifying: BTreeMap::new(),
        };
        assert_eq!(selector.matches(&map(actual), &map(&[])), expected);
    }
}
