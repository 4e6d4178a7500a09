//! Shared assertions for fragment tests.

use roxmltree::{Document, Node};

use super::css::StyleRules;
use super::document::{NON_VISUAL, SHAPES, SVG_NS};
use super::geom::parse_view_box;
use super::paint::{is_visible_paint, node_cascaded};

/// Parse `svg` as a standalone document with an SVG root and a viewBox.
pub fn assert_standalone(svg: &str) -> Document<'_> {
    let doc = Document::parse(svg).unwrap_or_else(|e| panic!("fragment does not parse: {e}\n{svg}"));
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg", "{svg}");
    assert_eq!(root.tag_name().namespace(), Some(SVG_NS), "{svg}");
    assert!(
        root.attribute("viewBox").and_then(parse_view_box).is_some(),
        "missing viewBox: {svg}"
    );
    doc
}

/// Every rendered primitive (and `<use>` site) resolves to a visible fill
/// or a visible, non-zero stroke, counting the fragment's own `<style>`.
///
/// Content under `<defs>`/`<symbol>` may leave fill unset (it comes from
/// the use site) but must not be hidden by its own `fill="none"`.
pub fn assert_visible(svg: &str) {
    let doc = assert_standalone(svg);
    let css: String = doc
        .descendants()
        .filter(|n| n.tag_name().name() == "style")
        .flat_map(|n| n.children().filter_map(|c| c.text()))
        .collect();
    let sheet = StyleRules::parse(&css);

    for node in doc.descendants().filter(|n| n.is_element()) {
        let name = node.tag_name().name();
        if !(SHAPES.contains(&name) || name == "use") || inside(node, NON_VISUAL) {
            continue;
        }
        let referenced = inside(node, &["defs", "symbol"]);

        let fill = resolved(node, &sheet, "fill");
        let stroke = resolved(node, &sheet, "stroke");
        let width_zero = resolved(node, &sheet, "stroke-width").is_some_and(|w| w.trim() == "0");
        let stroke_visible = stroke.as_deref().is_some_and(is_visible_paint) && !width_zero;
        let fill_visible = match fill.as_deref() {
            Some(fill) => is_visible_paint(fill),
            None => referenced,
        };

        let visible = if name == "line" {
            stroke_visible || (referenced && stroke.is_none())
        } else {
            fill_visible || stroke_visible
        };
        assert!(visible, "invisible <{name}> in fragment:\n{svg}");
        assert!(
            !fill.is_some_and(|f| f.eq_ignore_ascii_case("currentColor"))
                && !stroke.is_some_and(|s| s.eq_ignore_ascii_case("currentColor")),
            "unresolved currentColor on <{name}>:\n{svg}"
        );
    }
}

fn inside(node: Node<'_, '_>, names: &[&str]) -> bool {
    node.ancestors()
        .skip(1)
        .any(|a| names.contains(&a.tag_name().name()))
}

/// Nearest declared value of a property, after the cascade.
fn resolved(node: Node<'_, '_>, sheet: &StyleRules, name: &str) -> Option<String> {
    node.ancestors()
        .filter(Node::is_element)
        .find_map(|n| node_cascaded(n, sheet, name))
}
