//! Fragment synthesis.
//!
//! Each candidate goes through the same pipeline:
//!
//! ```text
//! detach ─► bake inherited paint ─► unhide ─► carry <style>/<defs> ─► repair
//!        ─► resolve viewBox ─► serialize ─► re-parse check
//! ```
//!
//! The source tree is only read. Discovery runs the first half of this
//! pipeline too ([`isolate`]), so a candidate is measured exactly as it will
//! be rendered.

use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Node, NodeId};
use rustc_hash::FxHashSet;

use super::bounds;
use super::candidate::{IconCandidate, Strategy};
use super::css::StyleRules;
use super::document::{SVG_NS, SourceDocument, XLINK_NS, is_referenced_content};
use super::error::SynthesisError;
use super::geom::{self, BBox};
use super::naming::{self, IdSeed};
use super::node::{Child, ElementNode};
use super::paint::{self, Paint};
use crate::config::Config;
use crate::icon::{Dimensions, IconFragment};

/// Attributes that only make sense on a viewport element.
const VIEWPORT_ATTRS: &[&str] = &[
    "x",
    "y",
    "width",
    "height",
    "viewBox",
    "preserveAspectRatio",
    "refX",
    "refY",
    "version",
    "baseProfile",
    "zoomAndPan",
];

/// Upper bound on definitions carried into one fragment.
const MAX_CARRIED_DEFS: usize = 256;

static URL_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\([ \t\r\n]*['"]?#([^'"() \t\r\n]+)"#).unwrap()
});

/// A candidate copied out of its document, with the context it needs.
#[derive(Debug, Clone)]
pub struct Isolated {
    /// Repaired clone of the candidate element.
    pub content: ElementNode,
    /// `<style>` and `<defs>` placed before the content.
    pub context: Vec<ElementNode>,
    /// Frame declared by the element itself (a symbol's viewBox).
    pub frame: Option<BBox>,
}

impl Isolated {
    pub fn measure(&self) -> Option<BBox> {
        bounds::measure(&self.content, &self.context)
    }
}

/// Detach `node` and make it renderable on its own.
///
/// Returns `None` for foreign-namespace elements.
pub fn isolate(doc: &SourceDocument<'_>, node: Node<'_, '_>, config: &Config) -> Option<Isolated> {
    let whole = node.id() == doc.root().id();
    let mut content = ElementNode::detach(node)?;

    let frame = (content.name == "symbol")
        .then(|| content.attr("viewBox").and_then(geom::parse_view_box))
        .flatten();
    if whole || content.name == "symbol" {
        into_group(&mut content);
    }
    if !whole && !is_referenced_content(node) {
        paint::bake_inherited(&mut content, node, doc.sheet());
    }
    paint::unhide(&mut content);

    // The whole document already holds its own style and defs.
    let mut context = Vec::new();
    if !whole {
        let css = doc.style().filter(|_| config.synthesis.inline_style);
        if let Some(css) = css {
            let mut style = ElementNode::new("style");
            style.children.push(Child::Text(css.to_string()));
            context.push(style);
        }
        if let Some(defs) = carried_defs(doc, node, &content, css) {
            context.push(defs);
        }
    }

    // Class rules only reach the fragment if its stylesheet does.
    let no_rules = StyleRules::default();
    let sheet = if whole || config.synthesis.inline_style {
        doc.sheet()
    } else {
        &no_rules
    };
    paint::repair(&mut content, &Paint::default(), sheet, &config.synthesis);
    for element in &mut context {
        paint::repair(element, &Paint::default(), sheet, &config.synthesis);
    }

    Some(Isolated {
        content,
        context,
        frame,
    })
}

/// Turn one candidate into a standalone fragment.
///
/// `index` is the fragment's position within its file; it feeds the
/// ordinal fallback name and the id.
pub fn synthesize(
    candidate: &IconCandidate,
    doc: &SourceDocument<'_>,
    source: &str,
    index: usize,
    seed: IdSeed,
    config: &Config,
) -> Result<IconFragment, SynthesisError> {
    let node = doc.node(candidate.node).ok_or(SynthesisError::Isolate)?;
    let isolated = isolate(doc, node, config).ok_or(SynthesisError::Isolate)?;
    let whole = candidate.strategy == Strategy::Document;

    let (view_box, size) = resolve_frame(candidate, &isolated, doc, config);

    let mut root = ElementNode::new("svg").with_attr("xmlns", SVG_NS);
    if isolated.content.uses_xlink() || isolated.context.iter().any(ElementNode::uses_xlink) {
        root.set_attr("xmlns:xlink", XLINK_NS);
    }
    root.set_attr("viewBox", view_box.to_view_box());
    for element in isolated.context {
        root.push(element);
    }
    root.push(isolated.content);

    let svg_content = root.to_xml()?;
    let limit = config.limits.max_fragment_bytes();
    if svg_content.len() > limit {
        return Err(SynthesisError::Oversize {
            size: svg_content.len(),
            limit,
        });
    }
    check_standalone(&svg_content)?;

    let name = naming::name_from_element(node)
        .or_else(|| (!whole).then(|| naming::name_from_wrapper(doc, node)).flatten())
        .or_else(|| {
            whole
                .then(|| naming::humanize(naming::source_stem(source)))
                .flatten()
        })
        .unwrap_or_else(|| naming::ordinal_name(index));
    let id = naming::fragment_id(source, candidate.strategy, index, seed, &svg_content);

    let dimensions = Dimensions {
        width: size.0,
        height: size.1,
    };
    Ok(IconFragment::new(id, svg_content, name, dimensions, source, candidate.strategy))
}

/// Pick the fragment viewBox and its unpadded dimensions.
///
/// Order: the document's own frame (whole-document fragments), the
/// element's declared frame, the padded bounding box, the document viewBox,
/// and finally `0 0 24 24`.
fn resolve_frame(
    candidate: &IconCandidate,
    isolated: &Isolated,
    doc: &SourceDocument<'_>,
    config: &Config,
) -> (BBox, (f64, f64)) {
    let framed = |frame: BBox| (frame, (frame.width, frame.height));

    if candidate.strategy == Strategy::Document
        && let Some(frame) = doc.view_box()
    {
        return framed(frame);
    }
    if let Some(frame) = isolated.frame {
        return framed(frame);
    }
    let measured = candidate
        .bbox
        .or_else(|| isolated.measure())
        .filter(|bbox| !bbox.is_degenerate());
    if let Some(bbox) = measured {
        return (bbox.padded(config.synthesis.padding), (bbox.width, bbox.height));
    }
    framed(doc.view_box().unwrap_or_else(BBox::default_frame))
}

/// Re-parse a serialized fragment: it must be a standalone `<svg>` with a viewBox.
fn check_standalone(svg: &str) -> Result<(), SynthesisError> {
    let parsed = roxmltree::Document::parse(svg).map_err(|e| SynthesisError::Invalid(e.to_string()))?;
    let root = parsed.root_element();
    if root.tag_name().name() != "svg" || root.tag_name().namespace() != Some(SVG_NS) {
        return Err(SynthesisError::Invalid("root is not an SVG element".into()));
    }
    if root.attribute("viewBox").and_then(geom::parse_view_box).is_none() {
        return Err(SynthesisError::Invalid("missing viewBox".into()));
    }
    Ok(())
}

/// Rename a viewport element (`<svg>`, `<symbol>`) to a plain group.
fn into_group(element: &mut ElementNode) {
    element.name = "g".to_string();
    element
        .attrs
        .retain(|(name, _)| !VIEWPORT_ATTRS.contains(&name.as_str()));
}

// ============================================================================
// Referenced definitions
// ============================================================================

/// Collect every element `content` (or the inlined CSS) references by id,
/// transitively, into one `<defs>`.
///
/// Targets inside the candidate itself are already carried, so they are
/// skipped. Output follows document order.
fn carried_defs(
    doc: &SourceDocument<'_>,
    source: Node<'_, '_>,
    content: &ElementNode,
    css: Option<&str>,
) -> Option<ElementNode> {
    let mut pending = Vec::new();
    collect_references(content, &mut pending);
    if let Some(css) = css {
        pending.extend(url_references(css));
    }

    let mut seen = FxHashSet::default();
    let mut carried: Vec<(NodeId, ElementNode)> = Vec::new();
    while let Some(id) = pending.pop() {
        if carried.len() >= MAX_CARRIED_DEFS {
            break;
        }
        if !seen.insert(id.clone()) {
            continue;
        }
        let Some(target) = doc.by_id(&id) else {
            continue;
        };
        let inside = target.ancestors().any(|a| a.id() == source.id());
        let around = source.ancestors().any(|a| a.id() == target.id());
        if inside || around {
            continue;
        }
        let Some(element) = ElementNode::detach(target) else {
            continue;
        };
        collect_references(&element, &mut pending);
        carried.push((target.id(), element));
    }

    // A target nested inside another carried target comes along with it.
    let ids: FxHashSet<NodeId> = carried.iter().map(|(id, _)| *id).collect();
    carried.retain(|(id, _)| {
        doc.node(*id)
            .is_some_and(|n| !n.ancestors().skip(1).any(|a| ids.contains(&a.id())))
    });
    carried.sort_by_key(|(id, _)| id.get());

    if carried.is_empty() {
        return None;
    }
    let mut defs = ElementNode::new("defs");
    for (_, element) in carried {
        defs.push(element);
    }
    Some(defs)
}

fn collect_references(element: &ElementNode, out: &mut Vec<String>) {
    element.walk(&mut |e| {
        for (name, value) in &e.attrs {
            if name == "href" || name == "xlink:href" {
                if let Some(id) = value.trim().strip_prefix('#').filter(|id| !id.is_empty()) {
                    out.push(id.to_string());
                }
            } else {
                out.extend(url_references(value));
            }
        }
    });
}

/// Ids named by `url(#id)` paint and clip references.
fn url_references(text: &str) -> impl Iterator<Item = String> + '_ {
    URL_REF
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
