//! End-to-end scenarios for the clustering engine: partition and determinism
//! guarantees, render-loop behavior over multiple frames, badge cache
//! semantics, wraparound and hit testing.

use pinmap::prelude::*;
use pinmap::core::geo::{LatLng, Point};
use pinmap::symbol::{bitmap::BadgeStyle, cache::BadgeCache};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn markers_at(positions: &[(f64, f64)]) -> Vec<MapMarker> {
    positions
        .iter()
        .map(|&(lat, lng)| MapMarker::new(LatLng::new(lat, lng)))
        .collect()
}

fn view_over(lat: f64, lng: f64, scale: f64) -> ViewState {
    let p = LatLng::new(lat, lng).to_normalized();
    ViewState::new(p.x, p.y, scale, 800.0, 600.0)
}

fn synchronous_renderer(markers: Vec<MapMarker>) -> MarkerRenderer {
    init_logs();
    let mut renderer = MarkerRenderer::new_synchronous(MarkerConfig::default()).unwrap();
    renderer.set_markers(markers);
    renderer
}

#[test]
fn partition_invariant_holds_across_algorithms() {
    let markers = markers_at(&[
        (47.0, 11.0),
        (47.0, 11.0),
        (47.00002, 11.00002),
        (12.0, -70.0),
        (-33.9, 151.2),
        (12.0, -70.0001),
        (51.5, -0.12),
    ]);

    for algorithm in [
        ClusterAlgorithm::FirstMarker,
        ClusterAlgorithm::Grid,
        ClusterAlgorithm::Distance,
    ] {
        let config = MarkerConfig {
            cluster_algorithm: algorithm,
            ..Default::default()
        };
        let items = compute_clusters(&markers, &config, 4096.0);

        assert_eq!(items.len(), markers.len());
        let accounted: usize = items
            .iter()
            .filter(|i| !i.is_clustered_out)
            .map(|i| i.cluster_size + 1)
            .sum();
        assert_eq!(accounted, markers.len(), "algorithm {:?}", algorithm);
    }
}

#[test]
fn grid_clustering_is_deterministic() {
    let markers = markers_at(&[
        (47.0, 11.0),
        (47.1, 11.1),
        (47.0, 11.0),
        (12.0, -70.0),
        (47.05, 11.05),
    ]);
    let config = MarkerConfig::default();

    let first = compute_clusters(&markers, &config, 8192.0);
    for _ in 0..10 {
        assert_eq!(compute_clusters(&markers, &config, 8192.0), first);
    }
}

#[test]
fn unchanged_frames_emit_identical_batches() {
    let mut renderer = synchronous_renderer(markers_at(&[
        (47.0, 11.0),
        (47.01, 11.01),
        (47.02, 10.99),
    ]));
    let view = view_over(47.0, 11.0, 4096.0);

    renderer.update(&view); // recluster frame
    renderer.update(&view); // first culled frame
    let first: Vec<(f32, f32)> = renderer
        .batch()
        .symbols()
        .iter()
        .map(|s| (s.screen_x, s.screen_y))
        .collect();
    assert!(!first.is_empty());

    renderer.update(&view); // unchanged frame
    let second: Vec<(f32, f32)> = renderer
        .batch()
        .symbols()
        .iter()
        .map(|s| (s.screen_x, s.screen_y))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn badge_cache_returns_same_instance_until_style_changes() {
    let mut cache = BadgeCache::new(BadgeStyle::from_config(&MarkerConfig::default()));

    let a = cache.get(5).unwrap();
    let b = cache.get(5).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let mut style = *cache.style();
    style.foreground = Color::opaque(0, 0, 0);
    cache.set_style(style);

    assert!(cache.is_empty());
    let c = cache.get(5).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn antimeridian_wraparound_flips_by_world_width() {
    let view = ViewState::new(0.25, 0.5, 16.0, 800.0, 600.0);
    let tile_scale = view.tile_scale();
    let flip = tile_scale / 2.0;

    // A synthetic marker exactly one pixel past the +flip boundary
    let projected_x = view.x + (flip + 1.0) / tile_scale;
    let (dx, _) = view.map_delta(projected_x, 0.5);
    assert!((dx - (flip + 1.0 - 2.0 * flip)).abs() < 1e-6);

    // And one pixel past the -flip boundary
    let projected_x = view.x - (flip + 1.0) / tile_scale;
    let (dx, _) = view.map_delta(projected_x, 0.5);
    assert!((dx - (-(flip + 1.0) + 2.0 * flip)).abs() < 1e-6);
}

#[test]
fn five_coincident_markers_form_one_cluster_of_five() {
    let markers = markers_at(&[(47.0, 11.0); 5]);
    let config = MarkerConfig {
        cluster_grid_size: 64,
        ..Default::default()
    };
    let items = compute_clusters(&markers, &config, 1024.0);

    let representatives: Vec<_> = items.iter().filter(|i| !i.is_clustered_out).collect();
    assert_eq!(representatives.len(), 1);
    assert_eq!(representatives[0].cluster_size, 4);
    assert_eq!(items.iter().filter(|i| i.is_clustered_out).count(), 4);

    // The badge shown is the one for five members
    let mut renderer = MarkerRenderer::new_synchronous(config).unwrap();
    renderer.set_markers(markers);
    let view = view_over(47.0, 11.0, 4.0);
    renderer.update(&view);
    renderer.update(&view);

    assert_eq!(renderer.batch().len(), 1);
    assert_eq!(renderer.cached_badges(), 1);
}

#[test]
fn empty_marker_list_renders_nothing_and_touches_no_cache() {
    let mut renderer = synchronous_renderer(Vec::new());
    let view = view_over(0.0, 0.0, 64.0);

    renderer.update(&view);
    renderer.update(&view);

    assert!(renderer.batch().is_compiled());
    assert_eq!(renderer.batch().len(), 0);
    assert_eq!(renderer.cached_badges(), 0);
}

#[test]
fn hit_test_prefers_front_marker_on_overlap() {
    let view = ViewState::new(0.5, 0.5, 1024.0, 800.0, 600.0);
    let tile_scale = view.tile_scale();

    // Two markers five pixels apart vertically, both pins containing the tap
    let upper = LatLng::from_normalized(Point::new(0.5, 0.5));
    let lower = LatLng::from_normalized(Point::new(0.5, 0.5 + 5.0 / tile_scale));

    let renderer = MarkerRenderer::new_synchronous(MarkerConfig::default()).unwrap();
    let mut layer = ItemizedLayer::with_renderer(renderer);
    layer.set_markers(vec![MapMarker::new(upper), MapMarker::new(lower)]);

    assert_eq!(layer.hit_test(400.0, 298.0, &view), Some(1));
}

#[test]
fn clustering_survives_zoom_steps() {
    // Zooming far enough in separates markers that cluster when zoomed out
    let markers = markers_at(&[(47.0, 11.0), (47.0, 11.3)]);
    let mut renderer = synchronous_renderer(markers);

    let far = view_over(47.0, 11.15, 4.0);
    renderer.update(&far);
    renderer.update(&far);
    assert_eq!(renderer.batch().len(), 1, "markers merge when zoomed out");

    let near = view_over(47.0, 11.15, 4096.0);
    renderer.update(&near);
    renderer.update(&near);
    assert_eq!(renderer.batch().len(), 2, "markers separate when zoomed in");
}

#[test]
fn strategy_switch_rebuilds_projection() {
    let markers = markers_at(&[(0.0, 0.0), (0.0, 0.0008), (0.0, -0.0008)]);
    let mut renderer = synchronous_renderer(markers);
    let view = view_over(0.0, 0.0, 4096.0);

    renderer.update(&view);
    renderer.update(&view);
    let grid_badges = renderer.batch().len();

    let mut config = renderer.config().clone();
    config.cluster_algorithm = ClusterAlgorithm::Distance;
    renderer.set_config(config).unwrap();

    renderer.update(&view);
    renderer.update(&view);
    assert_eq!(renderer.batch().len(), grid_badges);

    // Distance clustering anchors the badge on the centroid
    let symbol = &renderer.batch().symbols()[0];
    assert!((symbol.screen_x - 400.0).abs() < 1.0);
}
