//! Plain geometry helpers shared by discovery and synthesis.

use serde::{Deserialize, Serialize};

/// Default icon frame used when nothing else is determinable.
pub const DEFAULT_SIZE: f64 = 24.0;

/// Extent below which a box counts as degenerate.
const MIN_EXTENT: f64 = 0.5;

/// Axis-aligned box in user units. Also used for viewBox values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The `0 0 24 24` frame.
    pub const fn default_frame() -> Self {
        Self::new(0.0, 0.0, DEFAULT_SIZE, DEFAULT_SIZE)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grow on every side by `ratio * max(width, height)`.
    pub fn padded(&self, ratio: f64) -> Self {
        let pad = self.width.max(self.height) * ratio;
        Self::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }

    /// Zero or near-zero in both directions, or not finite.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.width.max(self.height) < MIN_EXTENT
    }

    /// Format as a `viewBox` attribute value.
    pub fn to_view_box(&self) -> String {
        format!(
            "{} {} {} {}",
            format_number(self.x),
            format_number(self.y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// Parse a `viewBox` value (`"minx miny width height"`, comma or space separated).
///
/// Rejects non-positive sizes.
pub fn parse_view_box(value: &str) -> Option<BBox> {
    let nums: Vec<f64> = value
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    match nums.as_slice() {
        &[x, y, w, h] if w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite() => {
            Some(BBox::new(x, y, w, h))
        }
        _ => None,
    }
}

/// Parse a length attribute such as `"24"`, `"24px"` or `"1.5em"`.
///
/// Percentages have no absolute meaning here and yield `None`.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    let number = value.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    number.trim().parse().ok().filter(|v: &f64| v.is_finite())
}

/// Parse a plain number attribute, treating garbage as absent.
#[inline]
pub fn parse_number(value: &str) -> Option<f64> {
    parse_length(value)
}

/// Count the numbers in a `points` list.
pub fn count_points(value: &str) -> usize {
    value
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|s| s.parse::<f64>().is_ok())
        .count()
}

/// Shortest decimal form with at most three fractional digits.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
