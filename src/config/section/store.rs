//! `[store]` section configuration.
//!
//! ```toml
//! [store]
//! path = "icons.json"   # relative to the config file's directory
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("icons.json"),
        }
    }
}
