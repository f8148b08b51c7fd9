//! One viewport per noise octave.

use island_zoom_core::{TileCoord, Viewport, ViewportDelta};

/// Each layer spans this fraction of the layer above it.
pub const LAYER_CONTRACTION: f64 = 0.5;

/// Point finer layers contract toward.
const TILE_CENTER: TileCoord = TileCoord(glam::DVec2::splat(0.5));

/// Viewports for the octave layers. `layers[0]` is the master viewport.
///
/// Finer layers move at `0.5^i` of the master's rate, so while the master
/// contains the tile centre every layer contains the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportStack {
    layers: Vec<Viewport>,
}

impl ViewportStack {
    /// Builds `depth` layers (at least one) below `master`.
    pub fn new(master: Viewport, depth: usize) -> Self {
        let mut layers = Vec::with_capacity(depth.max(1));
        layers.push(master);
        for i in 1..depth {
            let next = layers[i - 1].contract_toward(TILE_CENTER, LAYER_CONTRACTION);
            layers.push(next);
        }
        Self { layers }
    }

    pub fn master(&self) -> &Viewport {
        &self.layers[0]
    }

    pub fn layers(&self) -> &[Viewport] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Applies `delta` to the master and `delta · 0.5^i` to layer `i`.
    pub fn shift(&mut self, delta: ViewportDelta) {
        let mut scale = 1.0;
        for layer in &mut self.layers {
            *layer = layer.apply(delta * scale);
            scale *= LAYER_CONTRACTION;
        }
    }

    /// Rebuilds every layer from the unit square.
    pub fn reset(&mut self) {
        *self = Self::new(Viewport::UNIT, self.layers.len());
    }
}
