//! `[synthesis]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [synthesis]
//! padding = 0.1         # viewBox margin, fraction of max(width, height)
//! color = "#000000"     # baked for currentColor and unset paint
//! stroke_width = "1"    # added with a repaired stroke
//! inline_style = true   # carry the source <style> into every fragment
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Margin added on every side of a measured box.
    pub padding: f64,

    /// Paint used when a color must be invented.
    pub color: String,

    /// Stroke width used with a repaired stroke.
    pub stroke_width: String,

    /// Inline the source `<style>` content into fragments.
    pub inline_style: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            padding: 0.1,
            color: "#000000".to_string(),
            stroke_width: "1".to_string(),
            inline_style: true,
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(0.0..=1.0).contains(&self.padding) {
            diag.error(
                FieldPath::new("synthesis.padding"),
                format!("{} is outside 0.0..=1.0", self.padding),
            );
        }
        if self.color.trim().is_empty() || crate::svg::paint::is_current_color(&self.color) {
            diag.error_with_hint(
                FieldPath::new("synthesis.color"),
                "must be a concrete color",
                "e.g. \"#000000\"",
            );
        }
    }
}
