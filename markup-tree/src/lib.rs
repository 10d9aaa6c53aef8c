//! In-memory markup trees with deterministic serialization and a structural,
//! order-preserving merge.
//!
//! A [`Node`] is either a text leaf or an [`Element`] with a name, an attribute
//! map and ordered children. Trees are serialized with [`writer::write`] (or
//! `Display`) and combined with [`merge::merge`], which pairs children under a
//! caller-supplied [`Comparator`] and copies unmatched subtrees into a freshly
//! allocated result. Neither input is modified.
//!
//! ```
//! use markup_tree::{Element, Node};
//!
//! let left = Node::from(Element::with_attributes("a", [("x", "1")]));
//! let right = Node::from(Element::with_attributes("a", [("x", "2")]));
//!
//! let merged = left.merge(&right).expect("same root tag");
//! assert_eq!(merged.to_text(), "<a x=\"2\"/>\n");
//! ```

pub mod merge;
pub mod parser;
pub mod tree;
pub mod writer;

pub use merge::{
    merge, merge_with_options, merge_with_stats, Alignment, Comparator, ComparatorRules,
    KeyedComparator, MergeError, MergeOptions, MergeStats, TagNameComparator,
};
pub use parser::{parse, parse_file, ParseError};
pub use tree::{Element, ElementKind, Node, CDATA_SECTION, DOCUMENT, DOCUMENT_FRAGMENT};
pub use writer::{write, write_file, WriteError};
