use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::{Element, Node};

/// Errors that can occur while building a tree from markup text.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input markup could not be decoded or tokenized.
    #[error("failed to parse markup: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Input bytes were not valid UTF-8 for tag/attribute/text extraction.
    #[error("invalid UTF-8 while parsing markup: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// Failed to decode text entity or bytes.
    #[error("failed to decode markup text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// Failed to read input file.
    #[error("failed to read markup file: {0}")]
    Io(#[from] std::io::Error),
    /// Structural issue in the document.
    #[error("malformed markup: {0}")]
    Malformed(String),
}

/// Parse markup bytes into a tree rooted at a `#document` element.
///
/// Whitespace-only text is dropped and other text is trimmed, since the
/// serializer re-indents text leaves on their own lines. CDATA content becomes
/// a `#cdata-section` element. Comments, processing instructions, declarations
/// and doctypes are skipped.
pub fn parse(xml: &[u8]) -> Result<Element, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = vec![Element::document()];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let element = build_element(&e, &reader)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = build_element(&e, &reader)?;
                current(&mut stack)?.add_child(element);
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?;
                if !text.trim().is_empty() {
                    current(&mut stack)?.add_child(Element::cdata(text.trim()));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(ParseError::Malformed(
                        "encountered closing tag without open tag".to_string(),
                    ));
                }
                let element = stack.pop().ok_or_else(|| {
                    ParseError::Malformed("element stack underflow".to_string())
                })?;
                current(&mut stack)?.add_child(element);
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    if stack.len() != 1 {
        return Err(ParseError::Malformed(
            "unclosed element(s) at end of document".to_string(),
        ));
    }

    stack
        .pop()
        .ok_or_else(|| ParseError::Malformed("missing document root".to_string()))
}

/// Parse a markup file into a tree rooted at a `#document` element.
pub fn parse_file(path: &Path) -> Result<Element, ParseError> {
    let bytes = fs::read(path)?;
    parse(&bytes)
}

fn current(stack: &mut [Element]) -> Result<&mut Element, ParseError> {
    stack
        .last_mut()
        .ok_or_else(|| ParseError::Malformed("no open element".to_string()))
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    current(stack)?.add_child(Node::text(trimmed));
    Ok(())
}

fn build_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, ParseError> {
    let mut element = Element::new(qname_to_string(e.name())?);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = qname_to_string(attr.key)?;
        let value = attr.decode_and_unescape_value(reader.decoder())?;
        element.set_attribute(key, value);
    }

    Ok(element)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse, ParseError};
    use crate::tree::{ElementKind, Node};

    #[test]
    fn wraps_content_in_document_root() {
        let doc = parse(br#"<?xml version="1.0"?><root a="1"><child/></root>"#).expect("parse");

        assert_eq!(doc.kind(), ElementKind::Document);
        let root = doc.get_child("root").expect("root");
        assert_eq!(root.attribute("a"), Some("1"));
        assert!(root.get_child("child").is_some());
    }

    #[test]
    fn keeps_trimmed_text_and_cdata() {
        let doc = parse(b"<p>\n  hello &amp; bye\n  <![CDATA[ raw <b> ]]></p>").expect("parse");
        let p = doc.get_child("p").expect("p");

        assert_eq!(p.child(0).and_then(Node::as_text), Some("hello & bye"));
        let cdata = p.child(1).and_then(Node::as_element).expect("cdata");
        assert_eq!(cdata.kind(), ElementKind::CData);
        assert_eq!(cdata.child(0).and_then(Node::as_text), Some("raw <b>"));
    }

    #[test]
    fn rejects_unclosed_elements() {
        assert!(parse(b"<a><b></b>").is_err());
    }

    #[test]
    fn malformed_errors_describe_the_problem() {
        let err = ParseError::Malformed("no open element".to_string());
        assert_eq!(err.to_string(), "malformed markup: no open element");
    }

    #[test]
    fn rejects_stray_closing_tag() {
        assert!(parse(b"</a>").is_err());
    }

    #[test]
    fn accepts_multiple_top_level_elements() {
        let doc = parse(b"<a/><b/>").expect("parse");
        assert_eq!(doc.children().len(), 2);
    }
}
