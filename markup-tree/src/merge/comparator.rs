use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::tree::{Element, Node};

/// Decides whether two nodes stand for "the same node" during a merge.
pub trait Comparator {
    fn equivalent(&self, left: &Node, right: &Node) -> bool;
}

impl<F> Comparator for F
where
    F: Fn(&Node, &Node) -> bool,
{
    fn equivalent(&self, left: &Node, right: &Node) -> bool {
        self(left, right)
    }
}

/// Default equivalence: text leaves always match each other, elements match
/// when their names are equal, and a text leaf never matches an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagNameComparator;

impl Comparator for TagNameComparator {
    fn equivalent(&self, left: &Node, right: &Node) -> bool {
        match (left, right) {
            (Node::Text(_), Node::Text(_)) => true,
            (Node::Element(l), Node::Element(r)) => l.name() == r.name(),
            _ => false,
        }
    }
}

/// Per-tag refinements on top of tag-name equivalence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparatorRules {
    /// Tag -> attribute whose value must agree for two elements to match.
    pub keys: BTreeMap<String, String>,
    /// Tags whose children must match pairwise, in order, for two elements
    /// to match.
    pub deep: BTreeSet<String>,
}

impl ComparatorRules {
    /// Require `attribute` to agree on elements named `tag`.
    pub fn with_key(mut self, tag: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.keys.insert(tag.into(), attribute.into());
        self
    }

    /// Compare children of elements named `tag` recursively.
    pub fn with_deep(mut self, tag: impl Into<String>) -> Self {
        self.deep.insert(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.deep.is_empty()
    }

    /// Fold `other` into these rules; `other` wins on key collisions.
    pub fn extend(&mut self, other: ComparatorRules) {
        self.keys.extend(other.keys);
        self.deep.extend(other.deep);
    }
}

/// Comparator driven by [`ComparatorRules`].
///
/// Same-named elements listed under `deep` are equivalent only when they have
/// the same number of children and every positional pair is equivalent under
/// this comparator. Elements listed under `keys` are equivalent only when the
/// key attribute agrees (two absent values agree). Every other same-named pair
/// is equivalent. A tag listed in `deep` is not also checked against `keys`.
#[derive(Debug, Clone, Default)]
pub struct KeyedComparator {
    rules: ComparatorRules,
}

impl KeyedComparator {
    pub fn new(rules: ComparatorRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ComparatorRules {
        &self.rules
    }

    fn elements_equivalent(&self, left: &Element, right: &Element) -> bool {
        if left.name() != right.name() {
            return false;
        }

        if self.rules.deep.contains(left.name()) {
            return self.children_equivalent(left, right);
        }

        match self.rules.keys.get(left.name()) {
            Some(key) => left.attribute(key) == right.attribute(key),
            None => true,
        }
    }

    fn children_equivalent(&self, left: &Element, right: &Element) -> bool {
        left.children().len() == right.children().len()
            && left
                .children()
                .iter()
                .zip(right.children())
                .all(|(l, r)| self.equivalent(l, r))
    }
}

impl From<ComparatorRules> for KeyedComparator {
    fn from(rules: ComparatorRules) -> Self {
        Self::new(rules)
    }
}

impl Comparator for KeyedComparator {
    fn equivalent(&self, left: &Node, right: &Node) -> bool {
        match (left, right) {
            (Node::Text(_), Node::Text(_)) => true,
            (Node::Element(l), Node::Element(r)) => self.elements_equivalent(l, r),
            _ => false,
        }
    }
}
