//! Source layout trees
//!
//! A layout file is read into a plain [`SourceElement`] tree. Attribute names
//! keep their namespace prefix (`android:layout_width`, `app:srcCompat`,
//! `tools:text`) because rule documents address them that way.

use crate::error::{Result, TranslateError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Attribute name → raw attribute string, ordered for deterministic output.
pub type AttrMap = BTreeMap<String, String>;

pub const ID_ATTRIBUTE: &str = "android:id";
pub const STYLE_ATTRIBUTE: &str = "style";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceElement {
    pub tag: String,
    pub attributes: AttrMap,
    pub children: Vec<SourceElement>,
    /// Character data directly inside the element (resource files only).
    pub text: String,
}

impl SourceElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: AttrMap::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: SourceElement) -> Self {
        self.children.push(child);
        self
    }

    /// The declared id without its `@+id/` or `@id/` prefix.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get(ID_ATTRIBUTE).map(|raw| strip_id(raw))
    }

    /// Own text followed by the text of all descendants.
    pub fn text_content(&self) -> String {
        let mut text = self.text.clone();
        for child in &self.children {
            text.push_str(&child.text_content());
        }
        text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Number of elements in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SourceElement::count).sum::<usize>()
    }
}

pub fn strip_id(raw: &str) -> &str {
    raw.strip_prefix("@+id/")
        .or_else(|| raw.strip_prefix("@id/"))
        .or_else(|| raw.strip_prefix("@android:id/"))
        .unwrap_or(raw)
}

/// A source element seen from inside the translation: its attributes merged
/// over its style chain, and the scope of its parent.
#[derive(Debug)]
pub struct ElementScope<'a> {
    pub element: &'a SourceElement,
    pub attributes: AttrMap,
    pub parent: Option<&'a ElementScope<'a>>,
}

impl<'a> ElementScope<'a> {
    pub fn new(
        element: &'a SourceElement,
        attributes: AttrMap,
        parent: Option<&'a ElementScope<'a>>,
    ) -> Self {
        Self {
            element,
            attributes,
            parent,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Parent scopes, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a ElementScope<'a>> + 'a {
        std::iter::successors(self.parent, |scope| scope.parent)
    }
}

fn read_attributes(start: &BytesStart<'_>, file: &str) -> Result<AttrMap> {
    let mut attributes = AttrMap::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| TranslateError::parse(file, e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attribute
            .unescape_value()
            .map_err(|e| TranslateError::parse(file, e.to_string()))?;
        attributes.insert(key, value.into_owned());
    }
    Ok(attributes)
}

/// Read a layout document into its root element.
pub fn parse_layout(xml: &str, file: &str) -> Result<SourceElement> {
    parse_document(xml, file)
}

/// Read any XML document into an element tree, keeping character data.
pub fn parse_document(xml: &str, file: &str) -> Result<SourceElement> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<SourceElement> = Vec::new();
    let mut root: Option<SourceElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| TranslateError::parse(file, format!("at byte {}: {}", reader.buffer_position(), e)))?;
        match event {
            Event::Start(start) => {
                let mut element = SourceElement::new(String::from_utf8_lossy(start.name().as_ref()));
                element.attributes = read_attributes(&start, file)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let mut element = SourceElement::new(String::from_utf8_lossy(start.name().as_ref()));
                element.attributes = read_attributes(&start, file)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| TranslateError::parse(file, "unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| TranslateError::parse(file, e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(TranslateError::parse(file, "unexpected end of document"));
    }
    root.ok_or_else(|| TranslateError::parse(file, "document has no root element"))
}
