use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::merge::{self, Comparator, MergeError, TagNameComparator};
use crate::writer;

/// Name of the container element that stands for a whole document.
pub const DOCUMENT: &str = "#document";
/// Name of the container element that stands for a document fragment.
pub const DOCUMENT_FRAGMENT: &str = "#document-fragment";
/// Name of the element whose children are rendered inside a CDATA wrapper.
pub const CDATA_SECTION: &str = "#cdata-section";
/// Tag reported for text leaves in diagnostics.
pub const TEXT_TAG: &str = "#text";

/// How the serializer treats an element, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `#document` or `#document-fragment`: children only, no wrapping tag.
    Document,
    /// `#cdata-section`: children wrapped in `<![CDATA[ ... ]]>`.
    CData,
    /// Any other name.
    Ordinary,
}

/// A markup tree node: either a raw text leaf or an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Raw (unescaped) text content.
    Text(String),
    /// Named element with attributes and ordered children.
    Element(Element),
}

/// A named element with an attribute map and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl Node {
    /// Create a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    /// Whether this node is a text leaf.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(value) => Some(value),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Element name, or [`TEXT_TAG`] for text leaves.
    pub fn tag_name(&self) -> &str {
        match self {
            Node::Text(_) => TEXT_TAG,
            Node::Element(element) => &element.name,
        }
    }

    /// Serialize this node and its descendants.
    pub fn to_text(&self) -> String {
        writer::write(self)
    }

    /// Merge `other` into a new tree using tag-name equivalence.
    pub fn merge(&self, other: &Node) -> Result<Node, MergeError> {
        merge::merge(self, other, &TagNameComparator)
    }

    /// Merge `other` into a new tree using a caller-supplied comparator.
    pub fn merge_with<C>(&self, other: &Node, comparator: &C) -> Result<Node, MergeError>
    where
        C: Comparator + ?Sized,
    {
        merge::merge(self, other, comparator)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "element names must not be empty");
        Self {
            name,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Create an element and apply each initial attribute through
    /// [`Element::set_attribute`].
    pub fn with_attributes<I, K, V>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut element = Self::new(name);
        for (key, value) in attributes {
            element.set_attribute(key, value);
        }
        element
    }

    pub fn document() -> Self {
        Self::new(DOCUMENT)
    }

    pub fn fragment() -> Self {
        Self::new(DOCUMENT_FRAGMENT)
    }

    /// Create a `#cdata-section` holding a single text leaf.
    pub fn cdata(text: impl Into<String>) -> Self {
        let mut section = Self::new(CDATA_SECTION);
        section.add_child(Node::text(text));
        section
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        match self.name.as_str() {
            DOCUMENT | DOCUMENT_FRAGMENT => ElementKind::Document,
            CDATA_SECTION => ElementKind::CData,
            _ => ElementKind::Ordinary,
        }
    }

    /// Return the value of `name`, if set.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute names in iteration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in iteration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Create or overwrite an attribute. Names are not validated.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Set `name` to `value`, or remove it when `value` is `None`.
    pub fn set_optional_attribute(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(value) => self.set_attribute(name, value),
            None => {
                self.remove_attribute(name);
            }
        }
    }

    /// Apply `value` only when it differs from `default`.
    ///
    /// A `None` value that differs from a `Some` default removes the
    /// attribute, matching [`Element::set_optional_attribute`].
    pub fn set_attribute_if_different(
        &mut self,
        name: &str,
        value: Option<&str>,
        default: Option<&str>,
    ) {
        if value != default {
            self.set_optional_attribute(name, value);
        }
    }

    /// Append a child node.
    pub fn add_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Append `child` if present; `None` is ignored.
    pub fn add_optional_child<N: Into<Node>>(&mut self, child: Option<N>) {
        if let Some(child) = child {
            self.add_child(child);
        }
    }

    /// Append each node in order.
    pub fn add_children<I, N>(&mut self, children: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Child at `index`, or `None` when out of range.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Element children, skipping text leaves.
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Return the first child element with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&Element> {
        self.element_children().find(|child| child.name == tag)
    }

    /// Return all child elements with the provided tag.
    pub fn get_children(&self, tag: &str) -> Vec<&Element> {
        self.element_children()
            .filter(|child| child.name == tag)
            .collect()
    }

    /// Serialize this element and its descendants.
    pub fn to_text(&self) -> String {
        writer::write_element(self)
    }

    /// Merge `other` into a new tree using tag-name equivalence.
    pub fn merge(&self, other: &Element) -> Result<Node, MergeError> {
        self.merge_with(other, &TagNameComparator)
    }

    /// Merge `other` into a new tree using a caller-supplied comparator.
    pub fn merge_with<C>(&self, other: &Element, comparator: &C) -> Result<Node, MergeError>
    where
        C: Comparator + ?Sized,
    {
        let left = Node::Element(self.clone());
        let right = Node::Element(other.clone());
        merge::merge(&left, &right, comparator)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writer::write_to(self, f)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writer::write_element_to(self, f)
    }
}
