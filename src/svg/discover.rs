//! Candidate discovery.
//!
//! Structural strategies run in priority order, each a plain function from
//! the document to the elements it believes are icons. Escalation stops once
//! enough candidates are found. Positional grid clustering supplements a thin
//! result, and the whole document is the last resort.
//!
//! Every offered element passes the same gate ([`Found::offer`]): it must
//! hold a meaningful primitive, must not measure as degenerate, and must not
//! overlap (contain, sit inside, or reference) an element already accepted.

use roxmltree::Node;

use super::candidate::{IconCandidate, Strategy};
use super::document::{NON_VISUAL, SourceDocument, is_meaningful_shape, is_shape, is_visual};
use super::geom::BBox;
use super::grid::cluster_by_grid;
use super::synthesize::isolate;
use crate::config::Config;
use crate::debug;

/// A structural strategy: document in, elements in document order out.
type Collect = for<'a, 'input> fn(&'a SourceDocument<'input>, &Config) -> Vec<Node<'a, 'input>>;

/// Structural strategies, highest confidence first.
const STRATEGIES: &[(Strategy, Collect)] = &[
    (Strategy::Symbol, symbols),
    (Strategy::Definition, definitions),
    (Strategy::NamedGroup, named_groups),
    (Strategy::UseReference, use_references),
    (Strategy::Group, groups),
    (Strategy::DirectShape, direct_shapes),
];

/// Id/class fragments marking a group as layout rather than an icon.
const NON_ICON_ROLES: &[&str] = &["layer", "background"];

/// Find the icon candidates of one document.
///
/// Never returns two candidates for the same element, and every strategy is
/// capped, so this always terminates.
pub fn discover(doc: &SourceDocument<'_>, config: &Config) -> Vec<IconCandidate> {
    let settings = &config.discovery;
    let mut found = Found::new(doc, config);

    for &(strategy, collect) in STRATEGIES {
        if found.len() >= settings.sufficient {
            break;
        }
        let before = found.len();
        for node in collect(doc, config) {
            if found.len() - before >= settings.max_per_strategy {
                break;
            }
            found.offer(node, strategy, None);
        }
        debug!("discover"; "{}: {} candidates", strategy, found.len() - before);
    }

    if found.len() < settings.grid_below {
        let before = found.len();
        grid_cells(doc, config, &mut found);
        debug!("discover"; "grid: {} candidates", found.len() - before);
    }

    if found.is_empty() && doc.has_any_drawing() {
        debug!("discover"; "falling back to the whole document");
        found.accept(doc.root(), Strategy::Document, None);
    }

    found.candidates
}

/// Run positional clustering over the loose content of the document.
fn grid_cells<'a, 'input>(doc: &'a SourceDocument<'input>, config: &Config, found: &mut Found<'a, 'input>) {
    let min_path_length = config.discovery.min_path_length;
    let measured = doc
        .content_layer()
        .children()
        .filter(|n| is_visual(*n) && !has_non_icon_role(*n))
        .filter(|n| doc.has_drawing(*n, min_path_length))
        .filter(|n| !found.overlaps(*n))
        .take(config.grid.max_rows * config.grid.max_per_row)
        .map(|n| {
            let bbox = isolate(doc, n, config).and_then(|isolated| isolated.measure());
            (n, bbox)
        });

    let cells = cluster_by_grid(measured.collect::<Vec<_>>(), &config.grid);
    if let Some(last) = cells.last() {
        debug!("discover"; "grid: {} rows", last.row + 1);
    }
    for cell in cells {
        found.offer(cell.item, Strategy::GridCell, Some(cell.bbox));
    }
}

// ============================================================================
// Accepted set
// ============================================================================

struct Found<'a, 'input> {
    doc: &'a SourceDocument<'input>,
    config: &'a Config,
    nodes: Vec<Node<'a, 'input>>,
    candidates: Vec<IconCandidate>,
}

impl<'a, 'input> Found<'a, 'input> {
    fn new(doc: &'a SourceDocument<'input>, config: &'a Config) -> Self {
        Self {
            doc,
            config,
            nodes: Vec::new(),
            candidates: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Validate and accept `node`. Returns whether it was accepted.
    ///
    /// A box supplied by the caller is trusted; otherwise the element is
    /// measured and rejected when degenerate. Unmeasurable elements pass.
    fn offer(&mut self, node: Node<'a, 'input>, strategy: Strategy, bbox: Option<BBox>) -> bool {
        if self.overlaps(node) || !self.doc.has_drawing(node, self.config.discovery.min_path_length) {
            return false;
        }
        let bbox = bbox.or_else(|| isolate(self.doc, node, self.config).and_then(|i| i.measure()));
        if bbox.is_some_and(|b| b.is_degenerate()) {
            debug!("discover"; "skipped degenerate <{}>", node.tag_name().name());
            return false;
        }
        self.accept(node, strategy, bbox);
        true
    }

    fn accept(&mut self, node: Node<'a, 'input>, strategy: Strategy, bbox: Option<BBox>) {
        let candidate = IconCandidate::new(node.id(), strategy);
        self.candidates.push(match bbox {
            Some(bbox) => candidate.with_bbox(bbox),
            None => candidate,
        });
        self.nodes.push(node);
    }

    /// Whether `node` is, contains, sits inside, or references an accepted element.
    fn overlaps(&self, node: Node<'a, 'input>) -> bool {
        let related = |a: Node<'_, '_>, b: Node<'_, '_>| {
            a.ancestors().any(|x| x.id() == b.id()) || b.ancestors().any(|x| x.id() == a.id())
        };
        let references = |n: Node<'a, 'input>| {
            n.descendants()
                .filter(|d| d.tag_name().name() == "use")
                .filter_map(|d| self.doc.href_target(d))
                .any(|target| self.nodes.iter().any(|&accepted| related(target, accepted)))
        };
        self.nodes.iter().any(|&accepted| related(node, accepted)) || references(node)
    }
}

// ============================================================================
// Strategies
// ============================================================================

fn elements<'a, 'input>(doc: &'a SourceDocument<'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.root().descendants().filter(|n| n.is_element())
}

fn inside_non_visual(node: Node<'_, '_>) -> bool {
    node.ancestors()
        .skip(1)
        .any(|a| NON_VISUAL.contains(&a.tag_name().name()))
}

/// The content layer and the wrappers around it hold the whole sheet.
fn is_sheet_wrapper(doc: &SourceDocument<'_>, node: Node<'_, '_>) -> bool {
    doc.content_layer().ancestors().any(|a| a.id() == node.id())
}

fn symbols<'a, 'input>(doc: &'a SourceDocument<'input>, _: &Config) -> Vec<Node<'a, 'input>> {
    elements(doc)
        .filter(|n| n.tag_name().name() == "symbol")
        .collect()
}

/// Groups and primitives placed directly in `<defs>`.
fn definitions<'a, 'input>(doc: &'a SourceDocument<'input>, _: &Config) -> Vec<Node<'a, 'input>> {
    elements(doc)
        .filter(|n| n.tag_name().name() == "defs")
        .flat_map(|defs| defs.children())
        .filter(|n| n.tag_name().name() == "g" || is_shape(*n))
        .collect()
}

fn has_non_icon_role(node: Node<'_, '_>) -> bool {
    [node.attribute("id"), node.attribute("class")]
        .into_iter()
        .flatten()
        .map(str::to_ascii_lowercase)
        .any(|value| NON_ICON_ROLES.iter().any(|role| value.contains(role)))
}

/// `<g id>`/`<g class>` groups with drawing content.
///
/// A named group holding two or more qualifying named groups is a container
/// of icons rather than an icon, so it is skipped in favor of its children.
fn named_groups<'a, 'input>(doc: &'a SourceDocument<'input>, config: &Config) -> Vec<Node<'a, 'input>> {
    let min_path_length = config.discovery.min_path_length;
    let qualifying: Vec<Node<'a, 'input>> = elements(doc)
        .filter(|n| n.tag_name().name() == "g")
        .filter(|n| n.has_attribute("id") || n.has_attribute("class"))
        .filter(|n| !has_non_icon_role(*n) && !inside_non_visual(*n))
        .filter(|n| !is_sheet_wrapper(doc, *n))
        .filter(|n| doc.has_drawing(*n, min_path_length))
        .collect();

    qualifying
        .iter()
        .copied()
        .filter(|group| {
            let nested = qualifying
                .iter()
                .filter(|other| other.id() != group.id())
                .filter(|other| other.ancestors().any(|a| a.id() == group.id()))
                .take(2)
                .count();
            nested < 2
        })
        .collect()
}

/// Targets of `<use href="#id">`, each once, in order of first use.
fn use_references<'a, 'input>(doc: &'a SourceDocument<'input>, _: &Config) -> Vec<Node<'a, 'input>> {
    let mut targets: Vec<Node<'a, 'input>> = Vec::new();
    for use_site in elements(doc).filter(|n| n.tag_name().name() == "use") {
        if let Some(target) = doc.href_target(use_site)
            && !targets.iter().any(|t| t.id() == target.id())
        {
            targets.push(target);
        }
    }
    targets
}

/// Any `<g>` with a primitive or `<use>` among its direct children.
fn groups<'a, 'input>(doc: &'a SourceDocument<'input>, config: &Config) -> Vec<Node<'a, 'input>> {
    let max_children = config.discovery.max_group_children;
    elements(doc)
        .filter(|n| n.tag_name().name() == "g")
        .filter(|n| !inside_non_visual(*n) && !is_sheet_wrapper(doc, *n))
        .filter(|n| {
            n.children()
                .any(|c| is_shape(c) || c.tag_name().name() == "use")
        })
        .filter(|n| n.children().filter(|c| c.is_element()).count() <= max_children)
        .collect()
}

/// Bare primitives directly in the content layer.
fn direct_shapes<'a, 'input>(doc: &'a SourceDocument<'input>, config: &Config) -> Vec<Node<'a, 'input>> {
    let min_path_length = config.discovery.min_path_length;
    doc.content_layer()
        .children()
        .filter(|n| is_meaningful_shape(*n, min_path_length))
        .collect()
}
