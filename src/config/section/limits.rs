//! `[limits]` section configuration.
//!
//! Size guards that bound work by input size instead of wall-clock time.
//!
//! # Example
//!
//! ```toml
//! [limits]
//! max_file_size = "5MB"        # skip larger files before parsing
//! max_fragment_size = "512KB"  # skip larger serialized fragments
//! max_icons_per_file = 50      # per-file fragment ceiling
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input file size. Supports suffixes: B, KB, MB.
    pub max_file_size: String,

    /// Maximum serialized fragment size. Supports suffixes: B, KB, MB.
    pub max_fragment_size: String,

    /// Maximum number of fragments produced per file.
    pub max_icons_per_file: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: "5MB".to_string(),
            max_fragment_size: "512KB".to_string(),
            max_icons_per_file: 50,
        }
    }
}

impl LimitsConfig {
    const MAX_FILE_SIZE: FieldPath = FieldPath::new("limits.max_file_size");
    const MAX_FRAGMENT_SIZE: FieldPath = FieldPath::new("limits.max_fragment_size");
    const MAX_ICONS_PER_FILE: FieldPath = FieldPath::new("limits.max_icons_per_file");

    /// Input size limit in bytes (0 if unparseable; validation reports it).
    pub fn max_file_bytes(&self) -> usize {
        parse_size_string(&self.max_file_size).unwrap_or(0)
    }

    /// Fragment size limit in bytes.
    pub fn max_fragment_bytes(&self) -> usize {
        parse_size_string(&self.max_fragment_size).unwrap_or(0)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, value) in [
            (Self::MAX_FILE_SIZE, &self.max_file_size),
            (Self::MAX_FRAGMENT_SIZE, &self.max_fragment_size),
        ] {
            match parse_size_string(value) {
                None => diag.error_with_hint(
                    field,
                    format!("invalid size `{value}`"),
                    "use a number with an optional B, KB or MB suffix, e.g. \"5MB\"",
                ),
                Some(0) => diag.error(field, "must be greater than zero"),
                Some(_) => {}
            }
        }

        if self.max_icons_per_file == 0 {
            diag.error(Self::MAX_ICONS_PER_FILE, "must be greater than zero");
        }
    }
}

/// Parse size string (e.g., "10KB") to bytes
fn parse_size_string(s: &str) -> Option<usize> {
    let s = s.trim().to_uppercase();
    let (number, unit) = if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };
    number.trim().parse::<usize>().ok()?.checked_mul(unit)
}
