//! Screen-space grid clustering.
//!
//! Markers are bucketed into fixed-size square cells at the current zoom. The
//! first marker encountered in a cell becomes its representative; every later
//! occupant increments the representative's `cluster_size` and is flagged
//! `is_clustered_out`. The tie-break is deliberately the input list's own
//! order, which keeps repeated passes bit-identical.

use crate::{cluster::projected::ProjectedItem, marker::MapMarker};
use fxhash::FxHashMap;

/// Where a grid cluster's badge is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCenter {
    /// The first occupant's own projected position
    FirstMarker,
    /// The geometric center of the grid cell
    CellCenter,
}

/// Buckets markers into grid cells of `grid_size_px` device pixels.
///
/// Cells are addressed by `(floor(x * tile_scale / cell), floor(y * tile_scale / cell))`
/// folded into a single integer key. `grid_size_px` below one pixel is
/// clamped so the column count stays finite.
pub fn cluster_by_grid(
    markers: &[MapMarker],
    grid_size_px: f64,
    tile_scale: f64,
    center: GridCenter,
) -> Vec<ProjectedItem> {
    let cell = grid_size_px.max(1.0);
    let max_cols = (tile_scale / cell).ceil() as i64 + 1;

    let mut items: Vec<ProjectedItem> = Vec::with_capacity(markers.len());
    // cell key -> index of the representative in `items`
    let mut cells: FxHashMap<i64, usize> = FxHashMap::default();
    cells.reserve(markers.len() / 4 + 16);

    for (index, marker) in markers.iter().enumerate() {
        let projected = marker.position().to_normalized();
        let mut item = ProjectedItem::new(index, projected.x, projected.y);

        let col = (projected.x * tile_scale / cell).floor() as i64;
        let row = (projected.y * tile_scale / cell).floor() as i64;
        let key = col + row * max_cols;

        match cells.get(&key) {
            None => {
                cells.insert(key, items.len());
            }
            Some(&rep_index) => {
                item.is_clustered_out = true;

                let rep = &mut items[rep_index];
                rep.cluster_size += 1;
                if rep.cluster_size == 1 {
                    // Second occupant fixes the badge anchor
                    let (cx, cy) = match center {
                        GridCenter::FirstMarker => (rep.projected_x, rep.projected_y),
                        GridCenter::CellCenter => (
                            (col as f64 + 0.5) * cell / tile_scale,
                            (row as f64 + 0.5) * cell / tile_scale,
                        ),
                    };
                    rep.cluster_x = cx;
                    rep.cluster_y = cy;
                }
            }
        }

        items.push(item);
    }

    items
}
