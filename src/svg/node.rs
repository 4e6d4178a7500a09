//! Detached, owned element trees.
//!
//! Candidates are copied out of the read-only source tree into
//! [`ElementNode`]s before any repair happens, then written back out with
//! quick-xml.

use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use roxmltree::Node;

use super::document::{XLINK_NS, XML_NS, is_svg_element};
use super::error::SynthesisError;

/// Elements whose whitespace-only text is significant.
const TEXT_CONTAINERS: &[&str] = &["text", "tspan", "textPath", "style"];

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(ElementNode),
    Text(String),
}

/// Owned SVG element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Child>,
}

impl ElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn push(&mut self, child: ElementNode) {
        self.children.push(Child::Element(child));
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            Child::Element(e) => Some(e),
            Child::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut ElementNode> {
        self.children.iter_mut().filter_map(|c| match c {
            Child::Element(e) => Some(e),
            Child::Text(_) => None,
        })
    }

    /// Visit this element and every descendant element, pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a ElementNode)) {
        f(self);
        for child in self.elements() {
            child.walk(f);
        }
    }

    /// Whether any attribute in this subtree uses the `xlink:` prefix.
    pub fn uses_xlink(&self) -> bool {
        self.attrs.iter().any(|(k, _)| k.starts_with("xlink:"))
            || self.elements().any(ElementNode::uses_xlink)
    }

    /// Copy an element subtree out of the source tree.
    ///
    /// Elements and attributes from foreign namespaces (editor metadata) are
    /// dropped. Returns `None` when `node` itself is foreign or not an element.
    pub fn detach(node: Node<'_, '_>) -> Option<Self> {
        if !is_svg_element(node) {
            return None;
        }

        let mut element = Self::new(node.tag_name().name());
        for attr in node.attributes() {
            let name = match attr.namespace() {
                None => attr.name().to_string(),
                Some(XLINK_NS) => format!("xlink:{}", attr.name()),
                Some(XML_NS) => format!("xml:{}", attr.name()),
                Some(_) => continue,
            };
            element.attrs.push((name, attr.value().to_string()));
        }

        let keep_whitespace = TEXT_CONTAINERS.contains(&element.name.as_str());
        for child in node.children() {
            if child.is_element() {
                if let Some(child) = Self::detach(child) {
                    element.push(child);
                }
            } else if child.is_text()
                && let Some(text) = child.text()
                && (keep_whitespace || !text.trim().is_empty())
            {
                element.children.push(Child::Text(text.to_string()));
            }
        }

        Some(element)
    }

    /// Serialize this subtree as a standalone XML string.
    pub fn to_xml(&self) -> Result<String, SynthesisError> {
        let mut writer = Writer::new(Vec::with_capacity(1024));
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| SynthesisError::Serialize(e.to_string()))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), SynthesisError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        for child in &self.children {
            match child {
                Child::Element(element) => element.write_to(writer)?,
                Child::Text(text) => write_event(writer, Event::Text(BytesText::new(text)))?,
            }
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

#[inline]
fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SynthesisError> {
    writer
        .write_event(event)
        .map_err(|e| SynthesisError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_drops_foreign_namespaces() {
        let text = r##"<svg xmlns="http://www.w3.org/2000/svg"
                xmlns:xlink="http://www.w3.org/1999/xlink"
                xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
            <g id="a" inkscape:label="Layer">
                <inkscape:thing/>
                <use xlink:href="#p"/>
            </g>
        </svg>"##;
        let doc = roxmltree::Document::parse(text).unwrap();
        let g = doc
            .descendants()
            .find(|n| n.attribute("id") == Some("a"))
            .unwrap();

        let element = ElementNode::detach(g).unwrap();
        assert_eq!(element.attrs, vec![("id".to_string(), "a".to_string())]);
        assert_eq!(element.elements().count(), 1);
        assert!(element.uses_xlink());
        assert_eq!(element.to_xml().unwrap(), r##"<g id="a"><use xlink:href="#p"/></g>"##);
    }

    #[test]
    fn test_serialize_escapes() {
        let mut style = ElementNode::new("style");
        style.children.push(Child::Text("a > b { fill: red }".into()));
        let mut root = ElementNode::new("svg").with_attr("data-x", "1 < 2 & \"q\"");
        root.push(style);

        let xml = root.to_xml().unwrap();
        let parsed = roxmltree::Document::parse(&xml).unwrap();
        let svg = parsed.root_element();
        assert_eq!(svg.attribute("data-x"), Some("1 < 2 & \"q\""));
        assert_eq!(
            svg.first_element_child().and_then(|s| s.text()),
            Some("a > b { fill: red }")
        );
    }

    #[test]
    fn test_attr_helpers() {
        let mut e = ElementNode::new("path").with_attr("fill", "red");
        e.set_attr("fill", "blue");
        e.set_attr("stroke", "black");
        assert_eq!(e.attr("fill"), Some("blue"));
        assert_eq!(e.remove_attr("stroke").as_deref(), Some("black"));
        assert_eq!(e.attr("stroke"), None);
    }
}
