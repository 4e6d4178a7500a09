//! Icon candidates: provisional icon subtrees found by discovery.

use roxmltree::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::geom::BBox;

/// Which discovery strategy produced a candidate, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Symbol,
    Definition,
    NamedGroup,
    UseReference,
    Group,
    DirectShape,
    GridCell,
    Document,
}

impl Strategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Definition => "definition",
            Self::NamedGroup => "named-group",
            Self::UseReference => "use-reference",
            Self::Group => "group",
            Self::DirectShape => "direct-shape",
            Self::GridCell => "grid-cell",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subtree of the source document believed to be one icon.
#[derive(Debug, Clone, PartialEq)]
pub struct IconCandidate {
    /// Source element (never mutated).
    pub node: NodeId,
    pub strategy: Strategy,
    /// Position in source coordinates, when already measured.
    pub bbox: Option<BBox>,
}

impl IconCandidate {
    pub const fn new(node: NodeId, strategy: Strategy) -> Self {
        Self {
            node,
            strategy,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}
