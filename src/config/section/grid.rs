//! `[grid]` section configuration.
//!
//! Tuning for the positional clustering fallback.
//!
//! # Example
//!
//! ```toml
//! [grid]
//! row_tolerance = 50.0  # y quantization bucket
//! min_size = 3.0        # smaller cells are noise
//! max_per_row = 20
//! max_rows = 20
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub row_tolerance: f64,
    pub min_size: f64,
    pub max_per_row: usize,
    pub max_rows: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 50.0,
            min_size: 3.0,
            max_per_row: 20,
            max_rows: 20,
        }
    }
}

impl GridConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.row_tolerance.is_nan() || self.row_tolerance <= 0.0 {
            diag.error(
                FieldPath::new("grid.row_tolerance"),
                "must be a positive number",
            );
        }
        if self.min_size < 0.0 {
            diag.error(FieldPath::new("grid.min_size"), "must not be negative");
        }
    }
}
