use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

use quick_xml::escape::{escape, partial_escape};
use thiserror::Error;

use crate::tree::{Element, ElementKind, Node};

/// Spaces added per nesting level. Output from pretty printers that indent
/// four spaces per level will not match byte for byte.
const INDENT_WIDTH: usize = 2;

/// Errors that can occur while writing a serialized tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to format the tree.
    #[error("failed to format markup: {0}")]
    Fmt(#[from] fmt::Error),
    /// Failed to write output file.
    #[error("failed to write markup file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a [`Node`] tree into indented markup text.
pub fn write(node: &Node) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_to(node, &mut out);
    out
}

/// Serialize an [`Element`] tree into indented markup text.
pub fn write_element(element: &Element) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_element_to(element, &mut out);
    out
}

/// Serialize a [`Node`] tree into any [`fmt::Write`] sink.
pub fn write_to<W: Write + ?Sized>(node: &Node, out: &mut W) -> fmt::Result {
    write_node(node, 0, out)
}

/// Serialize an [`Element`] tree into any [`fmt::Write`] sink.
pub fn write_element_to<W: Write + ?Sized>(element: &Element, out: &mut W) -> fmt::Result {
    write_element_at(element, 0, out)
}

/// Serialize a [`Node`] tree and write it to `path`.
pub fn write_file(node: &Node, path: &Path) -> Result<(), WriteError> {
    let mut text = String::new();
    write_to(node, &mut text)?;
    fs::write(path, text)?;
    Ok(())
}

fn write_node<W: Write + ?Sized>(node: &Node, indent: usize, out: &mut W) -> fmt::Result {
    match node {
        Node::Text(value) => {
            pad(indent, out)?;
            out.write_str(&partial_escape(value.as_str()))?;
            out.write_char('\n')
        }
        Node::Element(element) => write_element_at(element, indent, out),
    }
}

fn write_element_at<W: Write + ?Sized>(
    element: &Element,
    indent: usize,
    out: &mut W,
) -> fmt::Result {
    match element.kind() {
        ElementKind::Document => write_children(element, indent, out),
        ElementKind::CData => {
            out.write_str("<![CDATA[\n")?;
            write_children(element, indent + INDENT_WIDTH, out)?;
            out.write_char('\n')?;
            pad(indent, out)?;
            out.write_str("]]>\n")
        }
        ElementKind::Ordinary => {
            pad(indent, out)?;
            write!(out, "<{}", element.name())?;
            for (name, value) in element.attributes() {
                write!(out, " {}=\"{}\"", name, escape(value))?;
            }

            if !element.has_children() {
                return out.write_str("/>\n");
            }

            out.write_str(">\n")?;
            write_children(element, indent + INDENT_WIDTH, out)?;
            pad(indent, out)?;
            writeln!(out, "</{}>", element.name())
        }
    }
}

fn write_children<W: Write + ?Sized>(
    element: &Element,
    indent: usize,
    out: &mut W,
) -> fmt::Result {
    for child in element.children() {
        write_node(child, indent, out)?;
    }
    Ok(())
}

fn pad<W: Write + ?Sized>(indent: usize, out: &mut W) -> fmt::Result {
    write!(out, "{:indent$}", "")
}
