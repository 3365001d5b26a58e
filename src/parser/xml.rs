//! Minimal XML element tree shared by the template parser, the document reader
//! and the exporter.
//!
//! Both template sources and exported documents are small, so they are read
//! into a tree first and walked afterwards. Leaf text is kept verbatim; text
//! interleaved with child elements (indentation) is dropped.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::core::{StructuralParseError, TaxformError};
use crate::model::split_path;

/// One element with its attributes, leaf text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Element name
    pub name: String,
    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
    /// Text content (only meaningful for leaves)
    pub text: String,
    /// Child elements in source order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Attribute value by name, `None` when absent or blank.
    #[must_use]
    pub fn attr_non_empty(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Set (or replace) an attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// First child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First child with the given name, created at the end when missing.
    pub fn child_or_insert(&mut self, name: &str) -> &mut Self {
        let index = match self.children.iter().position(|child| child.name == name) {
            Some(index) => index,
            None => {
                self.children.push(Self::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Append a new child and return it.
    pub fn push_child(&mut self, node: Self) -> &mut Self {
        self.children.push(node);
        let index = self.children.len() - 1;
        &mut self.children[index]
    }

    /// Follow a slash-delimited path, taking the first matching child at each step.
    #[must_use]
    pub fn find_path(&self, path: &str) -> Option<&Self> {
        split_path(path).try_fold(self, |node, segment| node.child(segment))
    }

    /// Every element below this one with the given name, depth first.
    #[must_use]
    pub fn descendants_named(&self, name: &str) -> Vec<&Self> {
        let mut found = Vec::new();
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            found.extend(child.descendants_named(name));
        }
        found
    }

    /// Follow a slash-delimited path, creating missing elements.
    pub fn path_or_insert(&mut self, path: &str) -> &mut Self {
        split_path(path).fold(self, |node, segment| node.child_or_insert(segment))
    }

    /// Serialise as a UTF-8 document with declaration and two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns [`TaxformError::XmlWriteError`] if the writer fails.
    pub fn to_document(&self) -> Result<String, TaxformError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        self.write_into(&mut writer)?;

        String::from_utf8(writer.into_inner().into_inner()).map_err(|e| {
            TaxformError::XmlWriteError {
                reason: e.to_string(),
            }
        })
    }

    fn write_into(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<(), TaxformError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        if self.children.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&self.text))).map_err(write_error)?;
        } else {
            for child in &self.children {
                child.write_into(writer)?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str()))).map_err(write_error)
    }
}

fn write_error(error: impl std::fmt::Display) -> TaxformError {
    TaxformError::XmlWriteError {
        reason: error.to_string(),
    }
}

/// Read a document into a tree and check its root element name.
///
/// # Errors
///
/// [`StructuralParseError::Xml`] when the text is not well-formed, and
/// [`StructuralParseError::MalformedRoot`] when the root element is missing or
/// has another name.
pub fn parse_tree(source: &str, expected_root: &str) -> Result<XmlNode, StructuralParseError> {
    let root = read_tree(source)?.ok_or_else(|| StructuralParseError::MalformedRoot {
        expected: expected_root.to_string(),
        found: String::new(),
    })?;
    if root.name != expected_root {
        return Err(StructuralParseError::MalformedRoot {
            expected: expected_root.to_string(),
            found: root.name,
        });
    }
    Ok(root)
}

/// Read a document into a tree, whatever its root. `None` for a document
/// without elements.
///
/// # Errors
///
/// [`StructuralParseError::Xml`] when the text is not well-formed.
pub fn read_tree(source: &str) -> Result<Option<XmlNode>, StructuralParseError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| StructuralParseError::Xml {
            position,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => stack.push(element(&e, position)?),
            Event::Empty(e) => {
                let node = element(&e, position)?;
                attach(&mut stack, &mut root, node, position)?;
            }
            Event::End(_) => {
                if let Some(mut node) = stack.pop() {
                    if !node.children.is_empty() {
                        node.text.clear();
                    }
                    attach(&mut stack, &mut root, node, position)?;
                }
            }
            Event::Text(e) => {
                if let Some(node) = stack.last_mut() {
                    let text = e.unescape().map_err(|err| StructuralParseError::Xml {
                        position,
                        message: err.to_string(),
                    })?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(StructuralParseError::Xml {
            position: reader.buffer_position() as u64,
            message: format!("unclosed element <{}>", open.name),
        });
    }

    Ok(root)
}

fn element(start: &BytesStart<'_>, position: u64) -> Result<XmlNode, StructuralParseError> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes().flatten() {
        let value = attr.unescape_value().map_err(|e| StructuralParseError::Xml {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        node.attrs.push((key, value.into_owned()));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
    position: u64,
) -> Result<(), StructuralParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if let Some(existing) = root {
        return Err(StructuralParseError::Xml {
            position,
            message: format!("second root element <{}> after <{}>", node.name, existing.name),
        });
    }
    *root = Some(node);
    Ok(())
}
