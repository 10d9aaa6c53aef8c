use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::merge::comparator::Comparator;
use crate::tree::{Element, Node};

/// Strategy used to pair up the children of two matched elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Match only at the current cursor positions; an unmatched left child is
    /// imported and only the left cursor advances. A single inserted sibling
    /// therefore shifts every later pair out of alignment.
    #[default]
    Greedy,
    /// Pair children along a longest common subsequence under the comparator,
    /// so insertions and deletions do not break alignment of later siblings.
    ///
    /// Costs `O(n * m)` comparator calls and memory for each pair of sibling
    /// lists of lengths `n` and `m`.
    Lookahead,
}

/// Configures merge behavior.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub alignment: Alignment,
}

/// Counters collected while merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Node pairs merged together, including the roots.
    pub matched: usize,
    /// Subtrees copied from the left tree without a partner.
    pub imported_left: usize,
    /// Subtrees copied from the right tree without a partner.
    pub imported_right: usize,
}

/// Errors produced when two roots cannot be merged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The comparator rejected the two roots.
    #[error("cannot merge <{left}> with <{right}>: roots are not equivalent")]
    Mismatch { left: String, right: String },
    /// The comparator accepted a text leaf paired with an element.
    #[error("cannot merge <{left}> with <{right}>: text and element nodes cannot be combined")]
    Shape { left: String, right: String },
}

/// Merge two trees into a newly allocated tree using greedy alignment.
///
/// Neither input is modified. Fails only when `comparator` rejects the two
/// roots (or pairs a text leaf with an element at the root).
pub fn merge<C>(left: &Node, right: &Node, comparator: &C) -> Result<Node, MergeError>
where
    C: Comparator + ?Sized,
{
    merge_with_options(left, right, comparator, &MergeOptions::default())
}

/// Merge two trees with custom options.
pub fn merge_with_options<C>(
    left: &Node,
    right: &Node,
    comparator: &C,
    options: &MergeOptions,
) -> Result<Node, MergeError>
where
    C: Comparator + ?Sized,
{
    merge_with_stats(left, right, comparator, options).map(|(node, _)| node)
}

/// Merge two trees and report how many nodes were matched or imported.
pub fn merge_with_stats<C>(
    left: &Node,
    right: &Node,
    comparator: &C,
    options: &MergeOptions,
) -> Result<(Node, MergeStats), MergeError>
where
    C: Comparator + ?Sized,
{
    let mut merger = Merger {
        comparator,
        alignment: options.alignment,
        stats: MergeStats::default(),
    };
    let node = merger.merge_roots(left, right)?;
    debug!(
        matched = merger.stats.matched,
        imported_left = merger.stats.imported_left,
        imported_right = merger.stats.imported_right,
        "merge complete"
    );
    Ok((node, merger.stats))
}

/// Deep-copy `node` into a fresh, independently owned subtree.
pub fn import(node: &Node) -> Node {
    match node {
        Node::Text(value) => Node::Text(value.clone()),
        Node::Element(source) => {
            let mut element = Element::new(source.name());
            for (name, value) in source.attributes() {
                element.set_attribute(name, value);
            }
            element.add_children(source.children().iter().map(import));
            Node::Element(element)
        }
    }
}

struct Merger<'a, C: ?Sized> {
    comparator: &'a C,
    alignment: Alignment,
    stats: MergeStats,
}

impl<C> Merger<'_, C>
where
    C: Comparator + ?Sized,
{
    fn merge_roots(&mut self, left: &Node, right: &Node) -> Result<Node, MergeError> {
        if !self.comparator.equivalent(left, right) {
            warn!(
                left = left.tag_name(),
                right = right.tag_name(),
                "roots are not equivalent; nothing merged"
            );
            return Err(MergeError::Mismatch {
                left: left.tag_name().to_string(),
                right: right.tag_name().to_string(),
            });
        }

        self.stats.matched += 1;
        match (left, right) {
            (Node::Text(_), Node::Text(value)) => Ok(Node::Text(value.clone())),
            (Node::Element(l), Node::Element(r)) => Ok(Node::Element(self.merge_elements(l, r))),
            _ => {
                warn!(
                    left = left.tag_name(),
                    right = right.tag_name(),
                    "comparator paired a text leaf with an element"
                );
                Err(MergeError::Shape {
                    left: left.tag_name().to_string(),
                    right: right.tag_name().to_string(),
                })
            }
        }
    }

    fn merge_elements(&mut self, left: &Element, right: &Element) -> Element {
        let mut result = Element::new(left.name());

        for (name, value) in left.attributes().chain(right.attributes()) {
            result.set_attribute(name, value);
        }

        match self.alignment {
            Alignment::Greedy => self.align_greedy(left.children(), right.children(), &mut result),
            Alignment::Lookahead => {
                self.align_lookahead(left.children(), right.children(), &mut result)
            }
        }

        result
    }

    fn align_greedy(&mut self, left: &[Node], right: &[Node], out: &mut Element) {
        let (mut i, mut j) = (0, 0);

        while i < left.len() && j < right.len() {
            if self.comparator.equivalent(&left[i], &right[j]) {
                self.merge_matched(&left[i], &right[j], out);
                j += 1;
            } else {
                self.import_left(&left[i], out);
            }
            i += 1;
        }

        self.import_rest(&left[i..], &right[j..], out);
    }

    fn align_lookahead(&mut self, left: &[Node], right: &[Node], out: &mut Element) {
        let (mut i, mut j) = (0, 0);

        for (li, rj) in common_pairs(left, right, self.comparator) {
            for child in &left[i..li] {
                self.import_left(child, out);
            }
            for child in &right[j..rj] {
                self.import_right(child, out);
            }
            self.merge_matched(&left[li], &right[rj], out);
            i = li + 1;
            j = rj + 1;
        }

        self.import_rest(&left[i..], &right[j..], out);
    }

    /// Merge a child pair the comparator has already accepted.
    fn merge_matched(&mut self, left: &Node, right: &Node, out: &mut Element) {
        match (left, right) {
            (Node::Text(_), Node::Text(value)) => {
                self.stats.matched += 1;
                out.add_child(Node::Text(value.clone()));
            }
            (Node::Element(l), Node::Element(r)) => {
                self.stats.matched += 1;
                trace!(tag = l.name(), "merging matched children");
                let merged = self.merge_elements(l, r);
                out.add_child(merged);
            }
            _ => {
                debug!(
                    left = left.tag_name(),
                    right = right.tag_name(),
                    "comparator paired a text leaf with an element; importing both"
                );
                self.import_left(left, out);
                self.import_right(right, out);
            }
        }
    }

    fn import_rest(&mut self, left: &[Node], right: &[Node], out: &mut Element) {
        for child in left {
            self.import_left(child, out);
        }
        for child in right {
            self.import_right(child, out);
        }
    }

    fn import_left(&mut self, node: &Node, out: &mut Element) {
        trace!(tag = node.tag_name(), "importing unmatched left child");
        self.stats.imported_left += 1;
        out.add_child(import(node));
    }

    fn import_right(&mut self, node: &Node, out: &mut Element) {
        trace!(tag = node.tag_name(), "importing unmatched right child");
        self.stats.imported_right += 1;
        out.add_child(import(node));
    }
}

/// Index pairs of a longest common subsequence of `left` and `right`, where
/// two nodes are "equal" when the comparator accepts them. Allocates
/// `(n + 1) * (m + 1)` length cells.
fn common_pairs<C>(left: &[Node], right: &[Node], comparator: &C) -> Vec<(usize, usize)>
where
    C: Comparator + ?Sized,
{
    let (n, m) = (left.len(), right.len());
    let width = m + 1;
    let mut matches = vec![false; n * m];
    // lengths[i * width + j] is the LCS length of left[i..] and right[j..].
    let mut lengths = vec![0usize; (n + 1) * width];

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            let matched = comparator.equivalent(&left[i], &right[j]);
            matches[i * m + j] = matched;
            lengths[i * width + j] = if matched {
                lengths[(i + 1) * width + j + 1] + 1
            } else {
                lengths[(i + 1) * width + j].max(lengths[i * width + j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(lengths[0]);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if matches[i * m + j] && lengths[i * width + j] == lengths[(i + 1) * width + j + 1] + 1 {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if lengths[(i + 1) * width + j] >= lengths[i * width + j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}
