//! Minimal owned XML element tree, read and written with `quick-xml`.
//!
//! The model format only uses elements and attributes, so text nodes,
//! comments and processing instructions are skipped on read. Attribute order
//! is kept so that writing is deterministic.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct XmlError(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set an attribute, replacing any existing value for `key`.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| XmlError(format!("element name is not UTF-8: {e}")))?
        .to_string();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError(format!("bad attribute on <{}>: {e}", element.name)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| XmlError(format!("attribute name is not UTF-8: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError(format!("bad value for {key} on <{}>: {e}", element.name)))?
            .into_owned();
        if element.attr(&key).is_some() {
            return Err(XmlError(format!(
                "duplicate attribute {key} on <{}>",
                element.name
            )));
        }
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError(format!(
            "unexpected second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Parse a document and return its root element.
pub fn parse(text: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        let event = reader.read_event().map_err(|e| {
            XmlError(format!("{e} (at byte {})", reader.buffer_position()))
        })?;
        match event {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let element = element_from(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError("closing tag without an open element".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError(format!("element <{}> is never closed", open.name)));
    }
    root.ok_or_else(|| XmlError("document has no root element".into()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError(e.to_string()))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError(e.to_string()))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError(e.to_string()))?;
    Ok(())
}

/// Serialize `root` behind an XML 1.0 / UTF-8 declaration. `indent` is the
/// number of spaces per level; `0` writes a single line.
pub fn write(root: &Element, indent: usize) -> Result<String, XmlError> {
    let mut writer = if indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    };
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| XmlError(e.to_string()))?;
    write_element(&mut writer, root)?;

    let mut text = String::from_utf8(writer.into_inner())
        .map_err(|e| XmlError(format!("output is not UTF-8: {e}")))?;
    text.push('\n');
    Ok(text)
}
