//! `[discovery]` section configuration.
//!
//! Escalation thresholds for the candidate strategy chain.
//!
//! # Example
//!
//! ```toml
//! [discovery]
//! sufficient = 3           # stop escalating once this many candidates
//! grid_below = 5           # grid fallback only below this many
//! max_per_strategy = 50
//! max_group_children = 50  # larger groups are not a single icon
//! min_path_length = 10     # shorter `d` data is a stray mark
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Stop trying lower-priority strategies once this many candidates exist.
    pub sufficient: usize,

    /// Run grid clustering only while structural strategies found fewer than this.
    pub grid_below: usize,

    /// Cap on candidates taken from any single strategy.
    pub max_per_strategy: usize,

    /// Groups with more element children than this are skipped.
    pub max_group_children: usize,

    /// Minimum trimmed length of a path's `d` attribute.
    pub min_path_length: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sufficient: 3,
            grid_below: 5,
            max_per_strategy: 50,
            max_group_children: 50,
            min_path_length: 10,
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.sufficient == 0 {
            diag.error(
                FieldPath::new("discovery.sufficient"),
                "must be greater than zero",
            );
        }
        if self.max_per_strategy == 0 {
            diag.error_with_hint(
                FieldPath::new("discovery.max_per_strategy"),
                "must be greater than zero",
                "every strategy would be disabled",
            );
        }
        if self.max_group_children == 0 {
            diag.error(
                FieldPath::new("discovery.max_group_children"),
                "must be greater than zero",
            );
        }
    }
}
