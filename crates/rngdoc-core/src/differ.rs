use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::types::*;

/// Answers "is this new since the baseline?" by matching names against the
/// baseline grammar. Neither grammar is modified.
pub struct BaselineDiffer<'a> {
    baseline: &'a Grammar,
}

impl<'a> BaselineDiffer<'a> {
    pub fn new(baseline: &'a Grammar) -> Self {
        Self { baseline }
    }

    /// True when the baseline has no top-level definition of `element`.
    pub fn is_new_element(&self, element: &str) -> bool {
        !self.baseline.has_element(element)
    }

    /// True when no baseline definition of `element` has an attribute named
    /// `attribute` anywhere below it.
    pub fn is_new_attribute(&self, element: &str, attribute: &str) -> bool {
        !self
            .baseline
            .element_definitions_named(element)
            .into_iter()
            .any(|e| {
                e.descendants_of(PatternKind::Attribute)
                    .any(|a| a.name_str() == attribute)
            })
    }
}

/// Element and attribute level changes between two grammars.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarDiff {
    pub added_elements: Vec<String>,
    pub removed_elements: Vec<String>,
    /// `(element, attribute)`, only for elements present in both grammars.
    pub added_attributes: Vec<(String, String)>,
    pub removed_attributes: Vec<(String, String)>,
}

impl GrammarDiff {
    pub fn is_empty(&self) -> bool {
        self.added_elements.is_empty()
            && self.removed_elements.is_empty()
            && self.added_attributes.is_empty()
            && self.removed_attributes.is_empty()
    }
}

/// Compare `current` against `baseline`. All lists come out sorted.
pub fn diff_grammars(baseline: &Grammar, current: &Grammar) -> GrammarDiff {
    let left = attribute_map(baseline);
    let right = attribute_map(current);

    let mut diff = GrammarDiff::default();

    for (name, right_attrs) in &right {
        match left.get(name) {
            None => diff.added_elements.push(name.to_string()),
            Some(left_attrs) => {
                for attr in right_attrs.difference(left_attrs) {
                    diff.added_attributes
                        .push((name.to_string(), attr.to_string()));
                }
                for attr in left_attrs.difference(right_attrs) {
                    diff.removed_attributes
                        .push((name.to_string(), attr.to_string()));
                }
            }
        }
    }
    for name in left.keys() {
        if !right.contains_key(name) {
            diff.removed_elements.push(name.to_string());
        }
    }

    diff
}

/// element name → names of attributes anywhere below any of its definitions
fn attribute_map(grammar: &Grammar) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut map: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for element in grammar.element_definitions() {
        let attrs = map.entry(element.name_str()).or_default();
        attrs.extend(
            element
                .descendants_of(PatternKind::Attribute)
                .map(PatternNode::name_str),
        );
    }
    map
}
