//! Extraction error types.
//!
//! Errors are scoped as narrowly as possible: a [`SynthesisError`] drops one
//! candidate, an [`ExtractError`] drops one file. Nothing here aborts a batch.

use std::str::Utf8Error;
use thiserror::Error;

/// The input could not be read as an SVG document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input is not valid UTF-8")]
    Encoding(#[source] Utf8Error),

    #[error("malformed SVG/XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

/// A whole file was skipped.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("file is {size} bytes, limit is {limit}")]
    Oversize { size: usize, limit: usize },

    #[error("failed to read file: {0}")]
    Read(#[source] std::io::Error),
}

impl ExtractError {
    /// Short label for summary lines.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse error",
            Self::Oversize { .. } => "oversize",
            Self::Read(_) => "read error",
        }
    }
}

/// A single candidate could not be turned into a fragment.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("candidate element could not be isolated")]
    Isolate,

    #[error("fragment is {size} bytes, limit is {limit}")]
    Oversize { size: usize, limit: usize },

    #[error("failed to serialize fragment: {0}")]
    Serialize(String),

    #[error("serialized fragment is not a standalone SVG: {0}")]
    Invalid(String),
}
