//! Distance-based clustering.
//!
//! Groups markers whose screen distance falls below a pixel radius at the
//! current zoom. An R-tree over the projected positions answers the
//! neighborhood queries; markers are consumed greedily in input order, so the
//! first unclaimed marker of each group is its representative and the badge
//! sits on the member centroid. Smoother under rotation and zoom than the
//! grid, at a higher cost per pass.

use crate::{cluster::projected::ProjectedItem, marker::MapMarker};
use rstar::{primitives::GeomWithData, RTree};

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Clusters markers whose projected distance is below `radius_px` device
/// pixels at the given tile scale.
pub fn cluster_by_distance(
    markers: &[MapMarker],
    radius_px: f64,
    tile_scale: f64,
) -> Vec<ProjectedItem> {
    let radius = radius_px.max(1.0) / tile_scale;
    let radius_sq = radius * radius;

    let positions: Vec<[f64; 2]> = markers
        .iter()
        .map(|m| {
            let p = m.position().to_normalized();
            [p.x, p.y]
        })
        .collect();

    let tree = RTree::bulk_load(
        positions
            .iter()
            .enumerate()
            .map(|(i, &p)| IndexedPoint::new(p, i))
            .collect(),
    );

    // owner[i] = representative marker index of i's group
    let mut owner: Vec<Option<usize>> = vec![None; markers.len()];
    // (centroid_x, centroid_y, member_count) per representative
    let mut centroids: Vec<(f64, f64, usize)> = vec![(0.0, 0.0, 0); markers.len()];

    for i in 0..markers.len() {
        if owner[i].is_some() {
            continue;
        }

        let mut members: Vec<usize> = tree
            .locate_within_distance(positions[i], radius_sq)
            .filter(|p| owner[p.data].is_none())
            .map(|p| p.data)
            .collect();
        // R-tree iteration order is unspecified; index order keeps the
        // centroid sum deterministic
        members.sort_unstable();

        let count = members.len();
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        for &m in &members {
            owner[m] = Some(i);
            sum_x += positions[m][0];
            sum_y += positions[m][1];
        }
        centroids[i] = (sum_x / count as f64, sum_y / count as f64, count);
    }

    let mut items: Vec<ProjectedItem> = Vec::with_capacity(markers.len());
    for (i, position) in positions.iter().enumerate() {
        let mut item = ProjectedItem::new(i, position[0], position[1]);

        match owner[i] {
            Some(rep) if rep == i => {
                let (cx, cy, count) = centroids[i];
                item.cluster_size = count - 1;
                if item.cluster_size > 0 {
                    item.cluster_x = cx;
                    item.cluster_y = cy;
                }
            }
            _ => {
                item.is_clustered_out = true;
            }
        }

        items.push(item);
    }

    items
}
