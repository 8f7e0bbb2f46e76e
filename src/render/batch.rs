//! GPU-facing symbol batch.
//!
//! The batch is the crate's only per-frame output: an ordered list of symbol
//! instances the host renderer uploads as-is. It is rebuilt by the driver's
//! compile step and left untouched on skipped frames.

use crate::symbol::bitmap::Bitmap;
use std::sync::Arc;

/// One symbol to draw this frame
#[derive(Debug, Clone)]
pub struct SymbolInstance {
    pub screen_x: f32,
    pub screen_y: f32,
    pub bitmap: Arc<Bitmap>,
    /// Whether the sprite faces the camera or lies flat on the ground plane
    pub is_billboard: bool,
    /// Offset from the bitmap's top-left to the pixel pinned at the screen
    /// position
    pub hotspot_x: f32,
    pub hotspot_y: f32,
}

/// Ordered symbol list compiled once per changed frame
#[derive(Debug, Default)]
pub struct SymbolBatch {
    symbols: Vec<SymbolInstance>,
    is_compiled: bool,
}

impl SymbolBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all symbols and marks the batch uncompiled
    pub fn clear(&mut self) {
        self.symbols.clear();
        self.is_compiled = false;
    }

    pub fn push(&mut self, symbol: SymbolInstance) {
        debug_assert!(!self.is_compiled, "pushed into a compiled batch");
        self.symbols.push(symbol);
    }

    /// Seals the batch for consumption by the host renderer
    pub fn compile(&mut self) {
        self.is_compiled = true;
    }

    pub fn is_compiled(&self) -> bool {
        self.is_compiled
    }

    pub fn symbols(&self) -> &[SymbolInstance] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
