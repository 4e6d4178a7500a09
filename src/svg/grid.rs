//! Grid/positional clustering.
//!
//! Fallback segmentation for sprite sheets with no usable structure: loose
//! elements are treated as boxes in 2D space, bucketed into rows by their
//! quantized top edge, and ordered left to right within each row. This is an
//! approximation; touching or overlapping icons are not separated.

use std::collections::BTreeMap;

use super::geom::BBox;
use crate::config::GridConfig;

/// One placed element: its payload, box, and grid position.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<T> {
    pub item: T,
    pub bbox: BBox,
    pub row: usize,
    pub column: usize,
}

/// Arrange measured elements into grid cells, row-major.
///
/// Elements without a box, or smaller than `min_size` in either direction,
/// are dropped. Rows and columns beyond the configured caps are dropped too.
pub fn cluster_by_grid<T>(
    items: impl IntoIterator<Item = (T, Option<BBox>)>,
    config: &GridConfig,
) -> Vec<GridCell<T>> {
    let tolerance = config.row_tolerance.max(f64::EPSILON);
    let mut rows: BTreeMap<i64, Vec<(T, BBox)>> = BTreeMap::new();

    for (item, bbox) in items {
        let Some(bbox) = bbox else { continue };
        if bbox.is_degenerate() || bbox.width < config.min_size || bbox.height < config.min_size {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let key = (bbox.y / tolerance).round() as i64;
        rows.entry(key).or_default().push((item, bbox));
    }

    rows.into_values()
        .take(config.max_rows)
        .enumerate()
        .flat_map(|(row, mut cells)| {
            cells.sort_by(|a, b| a.1.x.total_cmp(&b.1.x));
            cells
                .into_iter()
                .take(config.max_per_row)
                .enumerate()
                .map(move |(column, (item, bbox))| GridCell {
                    item,
                    bbox,
                    row,
                    column,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GridConfig {
        GridConfig {
            row_tolerance: 50.0,
            min_size: 3.0,
            max_per_row: 20,
            max_rows: 20,
        }
    }

    fn cell(x: f64, y: f64) -> Option<BBox> {
        Some(BBox::new(x, y, 24.0, 24.0))
    }

    #[test]
    fn test_rows_and_columns() {
        // Two rows with jitter, shuffled input order.
        let items = vec![
            ("b2", cell(40.0, 102.0)),
            ("a1", cell(0.0, 3.0)),
            ("b1", cell(0.0, 98.0)),
            ("a3", cell(80.0, 0.0)),
            ("a2", cell(40.0, -4.0)),
        ];
        let cells = cluster_by_grid(items, &config());
        let order: Vec<_> = cells.iter().map(|c| (c.item, c.row, c.column)).collect();
        assert_eq!(
            order,
            [
                ("a1", 0, 0),
                ("a2", 0, 1),
                ("a3", 0, 2),
                ("b1", 1, 0),
                ("b2", 1, 1)
            ]
        );
    }

    #[test]
    fn test_drops_small_and_unmeasured() {
        let items = vec![
            ("ok", cell(0.0, 0.0)),
            ("none", None),
            ("thin", Some(BBox::new(10.0, 0.0, 1.0, 30.0))),
            ("dot", Some(BBox::new(20.0, 0.0, 0.0, 0.0))),
        ];
        let cells = cluster_by_grid(items, &config());
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].item, "ok");
    }

    #[test]
    fn test_caps() {
        let config = GridConfig {
            max_per_row: 2,
            max_rows: 1,
            ..config()
        };
        let items = (0..4)
            .flat_map(|row| (0..4).map(move |col| ((row, col), cell(col as f64 * 30.0, row as f64 * 200.0))))
            .collect::<Vec<_>>();
        let cells = cluster_by_grid(items, &config);
        let picked: Vec<_> = cells.iter().map(|c| c.item).collect();
        assert_eq!(picked, [(0, 0), (0, 1)]);
    }
}
