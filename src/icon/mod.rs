//! Extracted icons and their persistence.
//!
//! [`IconFragment`] is the hand-off unit produced by extraction. Everything
//! except the metadata fields is fixed at creation; metadata starts empty and
//! is filled in by a human later.

pub mod store;

use serde::{Deserialize, Serialize};

use crate::svg::Strategy;
use crate::svg::naming::slugify;

pub use store::{IconRecord, IconStore};

/// Rendered size in user units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// One standalone icon extracted from a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconFragment {
    /// Unique within a run (and, in practice, across runs).
    pub id: String,
    /// Complete SVG document.
    pub svg_content: String,
    pub name: String,
    pub dimensions: Dimensions,
    /// Byte length of `svg_content`.
    pub file_size: usize,

    pub category: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub author: String,

    /// Source file name.
    pub source: String,
    pub strategy: Strategy,
}

impl IconFragment {
    /// Build a fragment with empty metadata.
    pub fn new(
        id: String,
        svg_content: String,
        name: String,
        dimensions: Dimensions,
        source: &str,
        strategy: Strategy,
    ) -> Self {
        Self {
            id,
            file_size: svg_content.len(),
            svg_content,
            name,
            dimensions,
            category: String::new(),
            description: String::new(),
            keywords: Vec::new(),
            license: String::new(),
            author: String::new(),
            source: source.to_string(),
            strategy,
        }
    }

    /// `{slugified name}.svg`
    pub fn download_name(&self) -> String {
        format!("{}.svg", slugify(&self.name))
    }
}
