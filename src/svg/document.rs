//! Source document parsing and validation.
//!
//! [`SourceDocument`] wraps a read-only `roxmltree` tree. Discovery and
//! synthesis only ever borrow it; every edit happens on a detached clone
//! (see [`super::node`]).

use roxmltree::{Document, Node, NodeId, ParsingOptions};
use rustc_hash::FxHashMap;

use super::css::StyleRules;
use super::error::ParseError;
use super::geom::{self, BBox};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Drawing primitives.
pub const SHAPES: &[&str] = &[
    "path", "circle", "rect", "polygon", "line", "ellipse", "polyline",
];

/// Containers whose content is never rendered directly.
pub const NON_VISUAL: &[&str] = &[
    "clipPath",
    "mask",
    "filter",
    "linearGradient",
    "radialGradient",
    "pattern",
    "marker",
    "style",
    "script",
    "title",
    "desc",
    "metadata",
];

/// Parsed representation of one uploaded SVG file.
pub struct SourceDocument<'input> {
    doc: Document<'input>,
    view_box: Option<BBox>,
    style: Option<String>,
    sheet: StyleRules,
    ids: FxHashMap<String, NodeId>,
}

impl<'input> SourceDocument<'input> {
    /// Parse and validate raw SVG text.
    pub fn parse(text: &'input str) -> Result<Self, ParseError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options)?;

        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(ParseError::NotSvg(root.tag_name().name().to_string()));
        }

        let view_box = root
            .attribute("viewBox")
            .and_then(geom::parse_view_box)
            .or_else(|| {
                let width = root.attribute("width").and_then(geom::parse_length)?;
                let height = root.attribute("height").and_then(geom::parse_length)?;
                (width > 0.0 && height > 0.0).then(|| BBox::new(0.0, 0.0, width, height))
            });

        let style = collect_style(&doc);
        let sheet = style.as_deref().map(StyleRules::parse).unwrap_or_default();

        let mut ids = FxHashMap::default();
        for node in doc.descendants().filter(Node::is_element) {
            if let Some(id) = node.attribute("id") {
                // First wins, as in browsers.
                ids.entry(id.to_string()).or_insert(node.id());
            }
        }

        Ok(Self {
            doc,
            view_box,
            style,
            sheet,
            ids,
        })
    }

    /// The root `<svg>` element.
    pub fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    pub fn node(&self, id: NodeId) -> Option<Node<'_, 'input>> {
        self.doc.get_node(id)
    }

    /// Declared viewBox, else `0 0 width height`, else `None`.
    pub fn view_box(&self) -> Option<BBox> {
        self.view_box
    }

    /// Concatenated content of every `<style>` block.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Rules parsed from [`style`](Self::style).
    pub fn sheet(&self) -> &StyleRules {
        &self.sheet
    }

    pub fn by_id(&self, id: &str) -> Option<Node<'_, 'input>> {
        self.ids.get(id).and_then(|&id| self.doc.get_node(id))
    }

    /// Resolve `href="#id"` / `xlink:href="#id"` on `node`.
    pub fn href_target(&self, node: Node<'_, 'input>) -> Option<Node<'_, 'input>> {
        href_id(node).and_then(|id| self.by_id(id))
    }

    /// The element whose children are the loose, top-level content.
    ///
    /// Descends through chains of single wrapper groups
    /// (`<svg><g><g>...content...</g></g></svg>`).
    pub fn content_layer(&self) -> Node<'_, 'input> {
        let mut layer = self.root();
        loop {
            let mut children = layer
                .children()
                .filter(|n| n.is_element() && is_visual(*n));
            match (children.next(), children.next()) {
                (Some(only), None) if only.tag_name().name() == "g" => layer = only,
                _ => return layer,
            }
        }
    }

    /// Whether the subtree under `node` holds at least one meaningful primitive.
    ///
    /// `<use>` references are followed a few levels deep.
    pub fn has_drawing(&self, node: Node<'_, 'input>, min_path_length: usize) -> bool {
        self.has_drawing_at(node, min_path_length, 0)
    }

    fn has_drawing_at(&self, node: Node<'_, 'input>, min_path_length: usize, depth: u8) -> bool {
        node.descendants().filter(Node::is_element).any(|n| {
            if is_meaningful_shape(n, min_path_length) {
                return true;
            }
            depth < 4
                && n.tag_name().name() == "use"
                && self
                    .href_target(n)
                    .filter(|target| !target.ancestors().any(|a| a == n))
                    .is_some_and(|target| self.has_drawing_at(target, min_path_length, depth + 1))
        })
    }

    /// Whether the document holds anything drawable at all, meaningful or not.
    pub fn has_any_drawing(&self) -> bool {
        self.root()
            .descendants()
            .filter(Node::is_element)
            .any(|n| is_shape(n) || matches!(n.tag_name().name(), "use" | "image" | "text"))
    }
}

fn collect_style(doc: &Document<'_>) -> Option<String> {
    let css: Vec<String> = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "style")
        .map(|n| n.children().filter_map(|c| c.text()).collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    (!css.is_empty()).then(|| css.join("\n"))
}

/// Element in the SVG namespace (or in no namespace at all).
pub fn is_svg_element(node: Node<'_, '_>) -> bool {
    node.is_element() && matches!(node.tag_name().namespace(), None | Some(SVG_NS))
}

pub fn is_shape(node: Node<'_, '_>) -> bool {
    is_svg_element(node) && SHAPES.contains(&node.tag_name().name())
}

pub fn is_visual(node: Node<'_, '_>) -> bool {
    is_svg_element(node) && !NON_VISUAL.contains(&node.tag_name().name()) && node.tag_name().name() != "defs"
}

/// Referenced id of a `<use>` (or gradient) element, without the `#`.
pub fn href_id<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    let raw = node
        .attribute("href")
        .or_else(|| node.attribute((XLINK_NS, "href")))?;
    raw.trim().strip_prefix('#').filter(|id| !id.is_empty())
}

/// Whether the node is rendered through a `<use>` rather than in place.
///
/// Paint for such content comes from the use site, not from its ancestors.
pub fn is_referenced_content(node: Node<'_, '_>) -> bool {
    node.ancestors()
        .any(|a| matches!(a.tag_name().name(), "defs" | "symbol"))
}

/// A primitive with non-trivial geometry.
pub fn is_meaningful_shape(node: Node<'_, '_>, min_path_length: usize) -> bool {
    if !is_shape(node) {
        return false;
    }
    let num = |name: &str| node.attribute(name).and_then(geom::parse_number);
    let positive = |name: &str| num(name).is_some_and(|v| v > 0.0);

    match node.tag_name().name() {
        "path" => node
            .attribute("d")
            .is_some_and(|d| d.trim().len() >= min_path_length.max(1)),
        "circle" => positive("r"),
        "ellipse" => positive("rx") && positive("ry"),
        "rect" => positive("width") && positive("height"),
        "line" => {
            let x = num("x2").unwrap_or(0.0) - num("x1").unwrap_or(0.0);
            let y = num("y2").unwrap_or(0.0) - num("y1").unwrap_or(0.0);
            x != 0.0 || y != 0.0
        }
        "polygon" | "polyline" => node
            .attribute("points")
            .is_some_and(|p| geom::count_points(p) >= 4),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            SourceDocument::parse("<svg><path d="),
            Err(ParseError::Xml(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_svg_root() {
        assert!(matches!(
            SourceDocument::parse("<html><body/></html>"),
            Err(ParseError::NotSvg(tag)) if tag == "html"
        ));
    }

    #[test]
    fn test_view_box_fallbacks() {
        let doc = SourceDocument::parse(r#"<svg viewBox="0 0 48 32"/>"#).unwrap();
        assert_eq!(doc.view_box(), Some(BBox::new(0.0, 0.0, 48.0, 32.0)));

        let doc = SourceDocument::parse(r#"<svg width="100px" height="50"/>"#).unwrap();
        assert_eq!(doc.view_box(), Some(BBox::new(0.0, 0.0, 100.0, 50.0)));

        let doc = SourceDocument::parse(r#"<svg width="100%" height="50"/>"#).unwrap();
        assert_eq!(doc.view_box(), None);
    }

    #[test]
    fn test_collects_style_blocks() {
        let doc = SourceDocument::parse(
            "<svg><style>.a{fill:red}</style><defs><style><![CDATA[.b{stroke:blue}]]></style></defs></svg>",
        )
        .unwrap();
        assert_eq!(doc.style(), Some(".a{fill:red}\n.b{stroke:blue}"));
        assert!(!doc.sheet().is_empty());

        let doc = SourceDocument::parse("<svg><style>  </style></svg>").unwrap();
        assert_eq!(doc.style(), None);
    }

    #[test]
    fn test_href_resolution() {
        let doc = SourceDocument::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
                <defs><path id="p" d="M0 0 L10 10 L0 10 Z"/></defs>
                <use xlink:href="#p"/><use href="#missing"/>
            </svg>"##,
        )
        .unwrap();
        let uses: Vec<_> = doc
            .root()
            .descendants()
            .filter(|n| n.tag_name().name() == "use")
            .collect();
        assert_eq!(
            doc.href_target(uses[0]).and_then(|n| n.attribute("id")),
            Some("p")
        );
        assert!(doc.href_target(uses[1]).is_none());
        assert!(doc.has_drawing(uses[0], 10));
    }

    #[test]
    fn test_meaningful_shapes() {
        let doc = SourceDocument::parse(
            r#"<svg>
                <path d="M0 0"/>
                <path d="M0 0 L10 10 L0 10 Z"/>
                <circle r="0"/>
                <circle r="4"/>
                <rect width="5" height="0"/>
                <line x1="1" y1="1" x2="1" y2="1"/>
                <line x2="5"/>
                <polygon points="0,0 1,1"/>
            </svg>"#,
        )
        .unwrap();
        let flags: Vec<bool> = doc
            .root()
            .children()
            .filter(|n| n.is_element())
            .map(|n| is_meaningful_shape(n, 10))
            .collect();
        assert_eq!(
            flags,
            [false, true, false, true, false, false, true, true]
        );
    }

    #[test]
    fn test_content_layer_descends_wrappers() {
        let doc = SourceDocument::parse(
            r#"<svg><defs/><g id="outer"><g id="inner"><path/><path/></g></g></svg>"#,
        )
        .unwrap();
        assert_eq!(doc.content_layer().attribute("id"), Some("inner"));
    }
}
