//! Minimal XML element tree built on `quick-xml`.
//!
//! Only what the grammar needs is kept: element names, attributes, the
//! concatenated character data of each element, children, and the source
//! line where each element starts.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Markup that is not well-formed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (line {line})")]
pub struct XmlSyntaxError {
    pub message: String,
    pub line: usize,
}

impl XmlSyntaxError {
    fn new(message: impl Into<String>, bytes: &[u8], offset: u64) -> Self {
        Self {
            message: message.into(),
            line: line_at(bytes, offset),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Character data directly inside this element, references resolved.
    pub text: String,
    /// 1-based line of the start tag.
    pub line: usize,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Parse bytes into an element tree rooted at the document element.
pub fn parse_tree(bytes: &[u8]) -> Result<XmlElement, XmlSyntaxError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let offset = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XmlSyntaxError::new(e.to_string(), bytes, reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                let element = open_element(&start, bytes, offset)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&start, bytes, offset)?;
                attach(element, &mut stack, &mut root, bytes, offset)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    XmlSyntaxError::new("unexpected closing tag", bytes, offset)
                })?;
                attach(element, &mut stack, &mut root, bytes, offset)?;
            }
            Event::Text(text) => {
                let text = utf8(&text, bytes, offset)?;
                push_text(text, &mut stack, bytes, offset)?;
            }
            Event::CData(data) => {
                let text = utf8(&data, bytes, offset)?;
                push_text(text, &mut stack, bytes, offset)?;
            }
            Event::GeneralRef(reference) => {
                let name = utf8(&reference, bytes, offset)?;
                let resolved = resolve_reference(name).ok_or_else(|| {
                    XmlSyntaxError::new(
                        format!("unknown entity reference '&{name};'"),
                        bytes,
                        offset,
                    )
                })?;
                let mut encoded = [0u8; 4];
                push_text(resolved.encode_utf8(&mut encoded), &mut stack, bytes, offset)?;
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlSyntaxError {
            message: format!("unexpected end of document: element <{}> is not closed", open.name),
            line: line_at(bytes, bytes.len() as u64),
        });
    }
    root.ok_or_else(|| XmlSyntaxError {
        message: "document has no root element".to_string(),
        line: 1,
    })
}

fn open_element(
    start: &BytesStart<'_>,
    bytes: &[u8],
    offset: u64,
) -> Result<XmlElement, XmlSyntaxError> {
    let name = utf8(start.name().as_ref(), bytes, offset)?.to_string();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|e| XmlSyntaxError::new(e.to_string(), bytes, offset))?;
        let key = utf8(attribute.key.as_ref(), bytes, offset)?.to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlSyntaxError::new(e.to_string(), bytes, offset))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
        line: line_at(bytes, offset),
    })
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    bytes: &[u8],
    offset: u64,
) -> Result<(), XmlSyntaxError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlSyntaxError::new(
            format!("extra content after the root element: <{}>", element.name),
            bytes,
            offset,
        ));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(
    text: &str,
    stack: &mut [XmlElement],
    bytes: &[u8],
    offset: u64,
) -> Result<(), XmlSyntaxError> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlSyntaxError::new(
            "character data outside the root element",
            bytes,
            offset,
        )),
    }
}

fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn utf8<'a>(raw: &'a [u8], bytes: &[u8], offset: u64) -> Result<&'a str, XmlSyntaxError> {
    std::str::from_utf8(raw)
        .map_err(|e| XmlSyntaxError::new(format!("invalid UTF-8: {e}"), bytes, offset))
}

fn line_at(bytes: &[u8], offset: u64) -> usize {
    let end = usize::try_from(offset).map_or(bytes.len(), |o| o.min(bytes.len()));
    1 + bytes[..end].iter().filter(|&&b| b == b'\n').count()
}
