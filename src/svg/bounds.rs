//! SVG bounding box calculation.
//!
//! Renders detached content into a usvg tree and takes the union of the
//! stroke-inclusive boxes, so stroke edges are never clipped by the
//! recovered viewBox.

use usvg::{Group, Node, Rect, Tree};

use super::document::{SVG_NS, XLINK_NS};
use super::geom::BBox;
use super::node::ElementNode;

/// Measure `content` in its own user space.
///
/// `context` elements (`<style>`, `<defs>`) are placed before the content so
/// class rules and references resolve. The measuring document has no
/// viewBox, so usvg's canvas space equals the content's user space.
///
/// # Returns
/// - `Some(BBox)` - Union of all visible nodes
/// - `None` - Nothing visible, or usvg rejected the content
pub fn measure(content: &ElementNode, context: &[ElementNode]) -> Option<BBox> {
    let mut root = ElementNode::new("svg")
        .with_attr("xmlns", SVG_NS)
        .with_attr("width", "1")
        .with_attr("height", "1");
    if content.uses_xlink() || context.iter().any(ElementNode::uses_xlink) {
        root.set_attr("xmlns:xlink", XLINK_NS);
    }
    for element in context {
        root.push(element.clone());
    }
    root.push(content.clone());

    let text = root.to_xml().ok()?;
    let tree = Tree::from_str(&text, &usvg::Options::default()).ok()?;

    calculate_stroke_bounds(&tree)
        .map(|r| BBox::new(r.x().into(), r.y().into(), r.width().into(), r.height().into()))
}

/// Union of the absolute stroke bounding boxes of every drawn leaf.
///
/// usvg keeps empty groups with a zero-size box; only leaves count.
fn calculate_stroke_bounds(tree: &Tree) -> Option<Rect> {
    let mut bounds = None;
    traverse_group(tree.root(), &mut bounds);
    bounds
}

fn traverse_group(group: &Group, bounds: &mut Option<Rect>) {
    for node in group.children() {
        match node {
            Node::Group(nested) => traverse_group(nested, bounds),
            leaf => *bounds = merge_bounds(*bounds, leaf.abs_stroke_bounding_box()),
        }
    }
}

/// Merge two optional bounding boxes into one
fn merge_bounds(a: Option<Rect>, b: Rect) -> Option<Rect> {
    match a {
        Some(existing) => {
            let min_x = existing.x().min(b.x());
            let min_y = existing.y().min(b.y());
            let max_x = existing.right().max(b.right());
            let max_y = existing.bottom().max(b.bottom());

            Rect::from_xywh(min_x, min_y, max_x - min_x, max_y - min_y)
        }
        None => Some(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: BBox, b: BBox) -> bool {
        (a.x - b.x).abs() < 0.01
            && (a.y - b.y).abs() < 0.01
            && (a.width - b.width).abs() < 0.01
            && (a.height - b.height).abs() < 0.01
    }

    #[test]
    fn test_measure_rect() {
        let rect = ElementNode::new("rect")
            .with_attr("x", "10")
            .with_attr("y", "20")
            .with_attr("width", "30")
            .with_attr("height", "40");
        let bbox = measure(&rect, &[]).unwrap();
        assert!(close(bbox, BBox::new(10.0, 20.0, 30.0, 40.0)), "{bbox:?}");
    }

    #[test]
    fn test_measure_includes_stroke_and_transform() {
        let mut g = ElementNode::new("g").with_attr("transform", "translate(100 0)");
        g.push(
            ElementNode::new("rect")
                .with_attr("width", "10")
                .with_attr("height", "10")
                .with_attr("fill", "none")
                .with_attr("stroke", "black")
                .with_attr("stroke-width", "2"),
        );
        let bbox = measure(&g, &[]).unwrap();
        assert!(close(bbox, BBox::new(99.0, -1.0, 12.0, 12.0)), "{bbox:?}");
    }

    #[test]
    fn test_measure_empty_is_none() {
        assert_eq!(measure(&ElementNode::new("g"), &[]), None);

        let mut nested = ElementNode::new("g");
        nested.push(ElementNode::new("g").with_attr("id", "inner"));
        assert_eq!(measure(&nested, &[]), None);
    }

    #[test]
    fn test_measure_ignores_empty_groups_beside_content() {
        let mut g = ElementNode::new("g");
        g.push(ElementNode::new("g").with_attr("transform", "translate(-500 -500)"));
        g.push(
            ElementNode::new("rect")
                .with_attr("x", "10")
                .with_attr("y", "10")
                .with_attr("width", "5")
                .with_attr("height", "5"),
        );
        let bbox = measure(&g, &[]).unwrap();
        assert!(close(bbox, BBox::new(10.0, 10.0, 5.0, 5.0)), "{bbox:?}");
    }

    #[test]
    fn test_merge_bounds() {
        let a = Rect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let b = Rect::from_xywh(-10.0, -10.0, 50.0, 50.0).unwrap();

        let m = merge_bounds(a, b).unwrap();
        assert_eq!(m.x(), -10.0);
        assert_eq!(m.y(), -10.0);
        assert_eq!(m.right(), 100.0);
        assert_eq!(m.bottom(), 100.0);
    }
}
