//! Memoized cluster badge bitmaps keyed by member count.
//!
//! Badges are rendered lazily and shared via `Arc`; a style mutation clears
//! the whole cache because bitmaps are not parameterized individually by
//! style. Every style-mutation entry point must go through [`BadgeCache::set_style`].

use crate::{
    symbol::bitmap::{render_badge, BadgeStyle, Bitmap},
    Result,
};
use fxhash::FxHashMap;
use std::sync::Arc;

pub struct BadgeCache {
    style: BadgeStyle,
    bitmaps: FxHashMap<u32, Arc<Bitmap>>,
}

impl BadgeCache {
    pub fn new(style: BadgeStyle) -> Self {
        Self {
            style,
            bitmaps: FxHashMap::default(),
        }
    }

    /// Returns the badge for a cluster of `count` markers, rendering it on
    /// first use. Repeated calls without a style change return the same
    /// bitmap instance.
    pub fn get(&mut self, count: u32) -> Result<Arc<Bitmap>> {
        // Counts above the cap all share the "+" badge
        let key = count.min(self.style.count_cap);

        if let Some(bitmap) = self.bitmaps.get(&key) {
            return Ok(Arc::clone(bitmap));
        }

        let bitmap = Arc::new(render_badge(key, &self.style)?);
        self.bitmaps.insert(key, Arc::clone(&bitmap));
        Ok(bitmap)
    }

    /// Replaces the style and drops every cached badge when it changed
    pub fn set_style(&mut self, style: BadgeStyle) {
        if self.style != style {
            self.style = style;
            self.bitmaps.clear();
        }
    }

    pub fn style(&self) -> &BadgeStyle {
        &self.style
    }

    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }
}
