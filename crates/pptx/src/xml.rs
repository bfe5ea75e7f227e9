//! A small element tree over quick-xml events, and a string builder for output.
//!
//! Package parts are small enough to hold in memory, and walking a tree is
//! far easier than tracking reader state across nested DrawingML.

use ppt_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element. `name` keeps the prefix as written, e.g. `p:sp`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &str) -> &str {
    match name.find(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

fn start_element(e: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::XmlError(format!("Bad attribute in <{name}>: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| Error::XmlError(format!("Bad attribute value in <{name}>: {err}")))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

/// Parse a document and return its root element.
pub fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(start_element(e)?),
            Ok(Event::Empty(ref e)) => {
                let element = start_element(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::XmlError("Unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlError(format!("Bad text content: {err}")))?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    root.ok_or_else(|| Error::XmlError("Document has no root element".to_string()))
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Element> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::XmlError(format!("Part is not UTF-8: {e}")))?;
    parse(text.trim_start_matches('\u{feff}'))
}

impl Element {
    pub fn local(&self) -> &str {
        local_name(&self.name)
    }

    pub fn is(&self, local: &str) -> bool {
        self.local() == local
    }

    /// Attribute by qualified name as written (`r:id`, `val`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// `1`/`true` and `0`/`false`.
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        match self.attr(name)? {
            "1" | "true" | "on" => Some(true),
            "0" | "false" | "off" => Some(false),
            _ => None,
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local))
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.is(local))
    }

    /// Follow a chain of child names.
    pub fn path(&self, locals: &[&str]) -> Option<&Element> {
        locals.iter().try_fold(self, |el, local| el.child(local))
    }

    /// First descendant with this local name, depth first.
    pub fn descendant(&self, local: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.is(local) {
                return Some(child);
            }
            if let Some(found) = child.descendant(local) {
                return Some(found);
            }
        }
        None
    }

    pub fn descendants<'a>(&'a self, local: &str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.is(local) {
                out.push(child);
            }
            child.descendants(local, out);
        }
    }

    /// `xmlns` and `xmlns:*` attributes carried by this element.
    pub fn namespace_decls(&self) -> impl Iterator<Item = &(String, String)> {
        self.attrs
            .iter()
            .filter(|(key, _)| key == "xmlns" || key.starts_with("xmlns:"))
    }

    /// Prefixes bound to `namespace` anywhere in this subtree.
    pub fn prefixes_for(&self, namespace: &str, out: &mut BTreeSet<String>) {
        for (key, value) in self.namespace_decls() {
            if value == namespace {
                if let Some(prefix) = key.strip_prefix("xmlns:") {
                    out.insert(prefix.to_string());
                }
            }
        }
        for child in self.elements() {
            child.prefixes_for(namespace, out);
        }
    }

    /// Call `f` with every attribute in this subtree.
    pub fn visit_attrs<F: FnMut(&str, &str)>(&self, f: &mut F) {
        for (key, value) in &self.attrs {
            f(key, value);
        }
        for child in self.elements() {
            child.visit_attrs(f);
        }
    }

    pub fn visit_attrs_mut<F: FnMut(&str, &mut String)>(&mut self, f: &mut F) {
        for (key, value) in &mut self.attrs {
            f(key, value);
        }
        for node in &mut self.children {
            if let Node::Element(child) = node {
                child.visit_attrs_mut(f);
            }
        }
    }

    /// Concatenated text of this element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Serialize back to markup. Namespace declarations are whatever the
    /// element itself carries.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(&escape(t.as_str())),
                Node::Element(e) => e.write_into(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Escape markup characters and drop control characters XML 1.0 cannot carry.
pub fn escape(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return quick_xml::escape::escape(text);
    }
    let cleaned: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    log::debug!(
        "dropped {} control character(s) from text",
        text.chars().count() - cleaned.chars().count()
    );
    Cow::Owned(quick_xml::escape::escape(cleaned.as_str()).into_owned())
}

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Appends markup to a string, escaping attribute values and text.
#[derive(Debug, Default)]
pub struct XmlBuilder {
    out: String,
}

impl XmlBuilder {
    pub fn new() -> Self {
        Self {
            out: XML_DECLARATION.to_string(),
        }
    }

    /// A builder for a fragment, without the declaration.
    pub fn fragment() -> Self {
        Self::default()
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(*value));
            self.out.push('"');
        }
    }

    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.tag(name, attrs);
        self.out.push('>');
        self
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.tag(name, attrs);
        self.out.push_str("/>");
        self
    }

    pub fn close(&mut self, name: &str) -> &mut Self {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.out.push_str(&escape(text));
        self
    }

    /// `<name attrs>text</name>`
    pub fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> &mut Self {
        self.open(name, attrs).text(text).close(name)
    }

    /// Markup that is already well formed.
    pub fn raw(&mut self, markup: &str) -> &mut Self {
        self.out.push_str(markup);
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("p:sp"), "sp");
        assert_eq!(local_name("a:t"), "t");
        assert_eq!(local_name("sp"), "sp");
    }

    #[test]
    fn test_parse_tree_and_text() {
        let root = parse(
            r#"<?xml version="1.0"?><p:sld xmlns:p="x"><p:cSld name="A &amp; B"><a:t> keep  spaces </a:t><a:br/></p:cSld></p:sld>"#,
        )
        .unwrap();
        assert!(root.is("sld"));
        let csld = root.child("cSld").unwrap();
        assert_eq!(csld.attr("name"), Some("A & B"));
        assert_eq!(root.descendant("t").unwrap().text(), " keep  spaces ");
        assert!(root.path(&["cSld", "br"]).is_some());
    }

    #[test]
    fn test_parse_rejects_broken_markup() {
        assert!(parse("<a><b></a>").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let source = r#"<a:p><a:r><a:t>x &lt; y</a:t></a:r><a:endParaRPr lang="en-US"/></a:p>"#;
        let root = parse(source).unwrap();
        assert_eq!(root.to_xml(), source);
    }

    #[test]
    fn test_builder_escapes() {
        let mut xml = XmlBuilder::fragment();
        xml.open("a:t", &[("title", "\"q\"")]).text("1 < 2").close("a:t");
        assert_eq!(xml.finish(), "<a:t title=\"&quot;q&quot;\">1 &lt; 2</a:t>");
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let mut xml = XmlBuilder::fragment();
        xml.leaf("a:t", &[("descr", "a\u{1}b")], "Q1\u{1}\u{8}Results\tok");
        assert_eq!(xml.finish(), "<a:t descr=\"ab\">Q1Results\tok</a:t>");

        let mut element = parse("<a:t>x</a:t>").unwrap();
        element.children = vec![Node::Text("1\u{1F}2".to_string())];
        assert_eq!(element.to_xml(), "<a:t>12</a:t>");
    }
}
