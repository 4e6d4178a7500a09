//! SVG icon extraction.
//!
//! Splits one SVG document into standalone icon fragments:
//!
//! ```text
//! text ─► SourceDocument::parse ─► discover ─► synthesize (per candidate) ─► fragments
//! ```
//!
//! # Modules
//!
//! | Module       | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | `document`   | Parsing, validation, read-only tree queries       |
//! | `discover`   | Ordered strategy chain with grid/document fallback|
//! | `grid`       | Positional row/column clustering                  |
//! | `synthesize` | Isolation, context carry-over, serialization      |
//! | `paint`      | Inherited paint baking and visibility repair      |
//! | `css`        | Stylesheet rules that take part in paint lookup   |
//! | `bounds`     | Stroke-inclusive bounding boxes via usvg          |
//! | `node`       | Detached owned element trees                      |
//! | `naming`     | Default names and fragment ids                    |

pub mod bounds;
pub mod candidate;
pub mod css;
pub mod discover;
pub mod document;
pub mod error;
pub mod geom;
pub mod grid;
pub mod naming;
pub mod node;
pub mod paint;
pub mod synthesize;

#[cfg(test)]
pub mod testing;

pub use candidate::{IconCandidate, Strategy};
pub use document::SourceDocument;
pub use error::{ExtractError, ParseError};
pub use naming::IdSeed;

use crate::config::Config;
use crate::icon::IconFragment;
use crate::{debug, log};

/// Fragments produced from one document.
#[derive(Debug, Default)]
pub struct Extraction {
    pub fragments: Vec<IconFragment>,
    /// Strategy of the first fragment, if any.
    pub strategy: Option<Strategy>,
    /// Candidates dropped during synthesis.
    pub skipped: usize,
}

/// Extract every icon from one SVG document.
///
/// `source` names the file (for ids and default names). Output is capped at
/// `limits.max_icons_per_file`. A candidate that fails synthesis is logged
/// and skipped; if none survive, the whole document is tried as one icon.
pub fn extract(source: &str, text: &str, config: &Config, seed: IdSeed) -> Result<Extraction, ParseError> {
    let doc = SourceDocument::parse(text)?;
    let candidates = discover::discover(&doc, config);
    debug!("extract"; "{}: {} candidates", source, candidates.len());

    let cap = config.limits.max_icons_per_file;
    let mut extraction = Extraction::default();
    for candidate in &candidates {
        if extraction.fragments.len() >= cap {
            debug!("extract"; "{}: capped at {} icons", source, cap);
            break;
        }
        let index = extraction.fragments.len();
        match synthesize::synthesize(candidate, &doc, source, index, seed, config) {
            Ok(fragment) => extraction.fragments.push(fragment),
            Err(e) => {
                log!("extract"; "{}: skipped {} candidate: {}", source, candidate.strategy, e);
                extraction.skipped += 1;
            }
        }
    }

    let tried_whole = candidates.iter().any(|c| c.strategy == Strategy::Document);
    if extraction.fragments.is_empty() && !tried_whole && doc.has_any_drawing() {
        let whole = IconCandidate::new(doc.root().id(), Strategy::Document);
        match synthesize::synthesize(&whole, &doc, source, 0, seed, config) {
            Ok(fragment) => extraction.fragments.push(fragment),
            Err(e) => log!("extract"; "{}: whole-document fallback failed: {}", source, e),
        }
    }

    extraction.strategy = extraction.fragments.first().map(|f| f.strategy);
    Ok(extraction)
}
