/// Per-frame derived state for one marker or cluster representative.
///
/// One re-clustering pass produces exactly one `ProjectedItem` per input
/// marker. Items flagged `is_clustered_out` contribute to another item's
/// `cluster_size` and are never pushed into the symbol batch themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedItem {
    /// Index of the originating marker in the snapshot taken at schedule time
    pub marker_index: usize,

    /// Normalized Mercator X, computed once per re-clustering pass
    pub projected_x: f64,
    /// Normalized Mercator Y, computed once per re-clustering pass
    pub projected_y: f64,

    /// Screen position, recomputed every frame from the viewport transform
    pub screen_x: f32,
    pub screen_y: f32,

    /// Rotation-dependent depth sort key
    pub z_order: f32,

    /// Number of additional markers merged into this item; `0` renders a
    /// plain marker, `> 0` renders a badge showing `cluster_size + 1`
    pub cluster_size: usize,

    /// Representative projected position for the badge, meaningful only when
    /// `cluster_size > 0`
    pub cluster_x: f64,
    pub cluster_y: f64,

    pub is_visible: bool,
    pub is_clustered_out: bool,
    /// Set for one frame on a visible-to-invisible transition so the compile
    /// step can drop the symbol without re-adding stale geometry
    pub is_modified: bool,
}

impl ProjectedItem {
    pub fn new(marker_index: usize, projected_x: f64, projected_y: f64) -> Self {
        debug_assert!(
            projected_x.is_finite() && projected_y.is_finite(),
            "non-finite projected coordinates are a caller precondition violation"
        );

        Self {
            marker_index,
            projected_x,
            projected_y,
            screen_x: 0.0,
            screen_y: 0.0,
            z_order: 0.0,
            cluster_size: 0,
            cluster_x: 0.0,
            cluster_y: 0.0,
            is_visible: false,
            is_clustered_out: false,
            is_modified: false,
        }
    }

    /// The projected position the symbol is drawn at: the cluster center for
    /// representatives, the marker's own position otherwise
    pub fn render_position(&self) -> (f64, f64) {
        if self.cluster_size > 0 {
            (self.cluster_x, self.cluster_y)
        } else {
            (self.projected_x, self.projected_y)
        }
    }

    /// True for items that should produce a symbol this frame
    pub fn is_batched(&self) -> bool {
        self.is_visible && !self.is_clustered_out && !self.is_modified
    }
}
