//! Clustering strategies and the projected-item model.
//!
//! The active strategy is a closed set selected by configuration and
//! dispatched through [`compute_clusters`]; switching strategies always
//! rebuilds the projected-item array from scratch.

pub mod distance;
pub mod grid;
pub mod projected;

use crate::{
    cluster::{
        distance::cluster_by_distance,
        grid::{cluster_by_grid, GridCenter},
        projected::ProjectedItem,
    },
    core::config::{ClusterAlgorithm, MarkerConfig},
    marker::MapMarker,
};

/// Rebuilds the projected-item array for one re-clustering pass.
///
/// The returned array partitions the marker list: every marker maps to
/// exactly one item, and every item not flagged `is_clustered_out` is either
/// a singleton or a cluster representative.
pub fn compute_clusters(
    markers: &[MapMarker],
    config: &MarkerConfig,
    tile_scale: f64,
) -> Vec<ProjectedItem> {
    if !config.is_clustering {
        return markers
            .iter()
            .enumerate()
            .map(|(index, marker)| {
                let p = marker.position().to_normalized();
                ProjectedItem::new(index, p.x, p.y)
            })
            .collect();
    }

    let grid_px = config.grid_size_px();

    match config.cluster_algorithm {
        ClusterAlgorithm::FirstMarker => {
            cluster_by_grid(markers, grid_px, tile_scale, GridCenter::FirstMarker)
        }
        ClusterAlgorithm::Grid => {
            cluster_by_grid(markers, grid_px, tile_scale, GridCenter::CellCenter)
        }
        ClusterAlgorithm::Distance => cluster_by_distance(markers, grid_px, tile_scale),
    }
}
