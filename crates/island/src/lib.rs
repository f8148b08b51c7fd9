#![deny(unsafe_code)]
//! Infinite zoom over procedurally generated island terrain.
//!
//! The engine keeps a cached *tile* of heights spanning `[0,1]²` in tile
//! space and a master viewport that pans toward a target on the coastline
//! while shrinking every frame. Each frame the tile is resampled into the
//! viewport and octaves of gradient noise are layered on top, one per
//! viewport in a [`ViewportStack`]. Once the viewport is less than half the
//! tile on both axes, the current view becomes the new tile and the
//! viewport resets to the unit square.
//!
//! Noise comes from any [`NoiseSource`]; failures abort the frame.

pub mod mask;
pub mod motion;
pub mod stack;

pub use motion::{advance_frame, frame_delta, PAN_DEAD_ZONE};
pub use stack::ViewportStack;

use island_zoom_core::params::{param_bool, param_f64, param_usize};
use island_zoom_core::sampling::{march_line, resample};
use island_zoom_core::{
    Engine, EngineError, Field, LineSegment, NoiseSource, PixelCoord, Resolution, TileCoord,
    Viewport, ViewportDelta,
};
use log::{debug, info, warn};
use serde_json::{json, Value};

/// Base frequency of the coarsest octave, in cycles per tile.
const DEFAULT_INITIAL_FREQUENCY: f64 = 4.0;
/// Number of noise octaves (and viewport layers).
const DEFAULT_OCTAVES: usize = 4;
/// Amplitude ratio between successive octaves.
const DEFAULT_PERSISTENCE: f64 = 0.5;
/// On-screen frequency ratio between successive octaves.
const DEFAULT_LACUNARITY: f64 = 2.0;
/// Pixels panned per frame toward the target.
const DEFAULT_PAN_SPEED: f64 = 1.0;
/// Pixels of the longer side each edge moves inward per frame.
const DEFAULT_ZOOM_SPEED: f64 = 1.0;
const MAX_OCTAVES: usize = 8;
const MIN_PERSISTENCE: f64 = 1e-3;

/// Default search segment: from the tile centre to three quarters along
/// the top edge.
const DEFAULT_SEGMENT: [f64; 4] = [0.5, 0.5, 0.75, 1.0];

/// A zoom increment fires once the viewport extent drops below this on
/// both axes.
pub const SHRINK_THRESHOLD: f64 = 0.5;

/// Tunable parameters of the zoom.
///
/// Use [`Default`] for a four-octave zoom starting from an island mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomParams {
    pub initial_frequency: f64,
    pub octaves: usize,
    /// Clamped to `(0, 1]`.
    pub persistence: f64,
    pub lacunarity: f64,
    pub pan_speed: f64,
    /// Clamped to `[0, max(width, height) / 4]` when the engine is built.
    pub zoom_speed: f64,
    /// Start zoom level zero from a central island instead of flat sea level.
    pub island_mask: bool,
    /// Segment searched for the coastline, in tile space.
    pub segment: LineSegment,
}

impl Default for ZoomParams {
    fn default() -> Self {
        let [x0, y0, x1, y1] = DEFAULT_SEGMENT;
        Self {
            initial_frequency: DEFAULT_INITIAL_FREQUENCY,
            octaves: DEFAULT_OCTAVES,
            persistence: DEFAULT_PERSISTENCE,
            lacunarity: DEFAULT_LACUNARITY,
            pan_speed: DEFAULT_PAN_SPEED,
            zoom_speed: DEFAULT_ZOOM_SPEED,
            island_mask: true,
            segment: LineSegment::new(TileCoord::new(x0, y0), TileCoord::new(x1, y1)),
        }
    }
}

impl ZoomParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    ///
    /// Out-of-range values are clamped rather than rejected.
    pub fn from_json(params: &Value) -> Self {
        let [x0, y0, x1, y1] = DEFAULT_SEGMENT;
        let segment = LineSegment::new(
            TileCoord::new(
                param_f64(params, "segment_x0", x0),
                param_f64(params, "segment_y0", y0),
            ),
            TileCoord::new(
                param_f64(params, "segment_x1", x1),
                param_f64(params, "segment_y1", y1),
            ),
        );
        Self {
            initial_frequency: param_f64(params, "initial_frequency", DEFAULT_INITIAL_FREQUENCY),
            octaves: param_usize(params, "octaves", DEFAULT_OCTAVES).clamp(1, MAX_OCTAVES),
            persistence: param_f64(params, "persistence", DEFAULT_PERSISTENCE)
                .clamp(MIN_PERSISTENCE, 1.0),
            lacunarity: param_f64(params, "lacunarity", DEFAULT_LACUNARITY),
            pan_speed: param_f64(params, "pan_speed", DEFAULT_PAN_SPEED).max(0.0),
            zoom_speed: param_f64(params, "zoom_speed", DEFAULT_ZOOM_SPEED).max(0.0),
            island_mask: param_bool(params, "island_mask", true),
            segment,
        }
    }

    /// Amplitude of octave `i`.
    pub fn amplitude(&self, octave: usize) -> f64 {
        self.persistence.powi(octave as i32)
    }

    /// Tile-space frequency of octave `i`.
    ///
    /// Layer `i` spans `0.5^i` of the master viewport, so on screen the
    /// octaves step by `lacunarity`.
    pub fn frequency(&self, octave: usize) -> f64 {
        self.initial_frequency * (self.lacunarity / stack::LAYER_CONTRACTION).powi(octave as i32)
    }
}

/// Whether `viewport` has shrunk enough to regenerate the tile.
pub fn should_increment_zoom(viewport: &Viewport) -> bool {
    let extent = viewport.extent();
    extent.x < SHRINK_THRESHOLD && extent.y < SHRINK_THRESHOLD
}

/// Finds the first sign change of `view` along `segment`.
///
/// `view` covers `viewport`; the segment is given in tile space and the
/// result is returned in tile space. Falls back to the viewport centre when
/// the sign never changes.
pub fn locate_target(view: &Field, segment: &LineSegment, viewport: &Viewport) -> TileCoord {
    let res = view.resolution();
    let start = viewport.to_pixel(segment.start, res);
    let end = viewport.to_pixel(segment.end, res);
    match march_line(view, start, end) {
        Some(p) => viewport.to_tile(p, res),
        None => {
            warn!(
                "no coastline between {:?} and {:?}, targeting viewport centre",
                segment.start.0, segment.end.0
            );
            viewport.center()
        }
    }
}

/// The infinite-zoom engine.
///
/// Owns the tile, the viewport stack and the target; the output field is
/// the view rendered for the current frame.
pub struct ZoomEngine<S: NoiseSource> {
    source: S,
    params: ZoomParams,
    res: Resolution,
    seed: u32,
    tile: Field,
    stack: ViewportStack,
    view: Field,
    target: TileCoord,
    segment: LineSegment,
    zoom: u32,
    frame: u64,
}

impl<S: NoiseSource> ZoomEngine<S> {
    /// Creates an engine at zoom level zero and renders its first view.
    ///
    /// The target is located once, on that first view. Only the low 32 bits
    /// of `seed` are used.
    ///
    /// Returns `EngineError::InvalidDimensions` if width or height is zero,
    /// or the noise source's error if the first view cannot be rendered.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        params: ZoomParams,
        source: S,
    ) -> Result<Self, EngineError> {
        let res = Resolution::new(width, height)?;
        let mut params = params;
        params.zoom_speed = params.zoom_speed.min(res.max_side() as f64 / 4.0);
        let tile = if params.island_mask {
            mask::island_mask(res)
        } else {
            Field::zeros(res)
        };
        let mut engine = Self {
            source,
            params,
            res,
            seed: seed as u32,
            view: tile.clone(),
            tile,
            stack: ViewportStack::new(Viewport::UNIT, params.octaves),
            target: Viewport::UNIT.center(),
            segment: params.segment,
            zoom: 0,
            frame: 0,
        };
        engine.view = engine.render_view()?;
        engine.target = locate_target(&engine.view, &engine.segment, engine.stack.master());
        debug!(
            "{} zoom: {width}x{height}, seed {}, target {:?}",
            engine.source.name(),
            engine.seed,
            engine.target.0
        );
        Ok(engine)
    }

    /// Creates an engine from a JSON params object.
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        json_params: &Value,
        source: S,
    ) -> Result<Self, EngineError> {
        Self::new(width, height, seed, ZoomParams::from_json(json_params), source)
    }

    pub fn zoom_params(&self) -> &ZoomParams {
        &self.params
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resolution(&self) -> Resolution {
        self.res
    }

    /// The cached tile for the current zoom level.
    pub fn tile(&self) -> &Field {
        &self.tile
    }

    pub fn viewport(&self) -> &Viewport {
        self.stack.master()
    }

    pub fn stack(&self) -> &ViewportStack {
        &self.stack
    }

    /// Target point in tile space.
    pub fn target(&self) -> TileCoord {
        self.target
    }

    pub fn segment(&self) -> &LineSegment {
        &self.segment
    }

    /// Number of tile regenerations so far.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Number of frames produced by [`Engine::step`].
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn layer_seed(&self, zoom: u32, octave: usize) -> u32 {
        self.seed.wrapping_add(zoom).wrapping_add(octave as u32)
    }

    fn next_delta(&self) -> ViewportDelta {
        frame_delta(
            self.stack.master(),
            self.target,
            self.res,
            self.params.pan_speed,
            self.params.zoom_speed,
        )
    }

    /// Pans and zooms every layer by one frame and returns the new master.
    pub fn advance_frame(&mut self) -> Viewport {
        let delta = self.next_delta();
        self.stack.shift(delta);
        *self.stack.master()
    }

    /// Replaces the tile with the current master region plus its first
    /// octave, remaps the target into the new tile and resets the stack.
    ///
    /// Leaves the engine untouched if the noise source fails.
    pub fn increment_zoom(&mut self) -> Result<(), EngineError> {
        let next = self.regenerate(self.stack.master())?;
        self.commit_zoom(next);
        Ok(())
    }

    /// Builds the next zoom level's tile from the region `old` of this one.
    fn regenerate(&self, old: &Viewport) -> Result<NextZoom, EngineError> {
        let mut tile = resample(&self.tile, old, self.res);
        let noise = self.source.generate(
            self.res,
            old,
            self.params.frequency(0),
            self.layer_seed(self.zoom, 0),
        )?;
        tile.add_assign(&noise)?;
        Ok(NextZoom {
            tile,
            target: old.normalize(self.target),
            segment: self.segment.normalize(old),
        })
    }

    fn commit_zoom(&mut self, next: NextZoom) {
        self.tile = next.tile;
        self.target = next.target;
        self.segment = next.segment;
        self.stack.reset();
        self.zoom += 1;
        info!(
            "zoom level {} at frame {}, target {:?}",
            self.zoom, self.frame, self.target.0
        );
    }

    /// Resamples the tile into the master viewport and adds one octave of
    /// noise per layer.
    pub fn render_view(&self) -> Result<Field, EngineError> {
        self.render(&self.tile, &self.stack, self.zoom)
    }

    fn render(&self, tile: &Field, stack: &ViewportStack, zoom: u32) -> Result<Field, EngineError> {
        let mut view = resample(tile, stack.master(), self.res);
        for (i, layer) in stack.layers().iter().enumerate() {
            let noise = self.source.generate(
                self.res,
                layer,
                self.params.frequency(i),
                self.layer_seed(zoom, i),
            )?;
            view.add_scaled_assign(&noise, self.params.amplitude(i))?;
        }
        Ok(view)
    }
}

/// Tile state for the next zoom level, built before it replaces the
/// current one.
struct NextZoom {
    tile: Field,
    target: TileCoord,
    segment: LineSegment,
}

impl<S: NoiseSource> Engine for ZoomEngine<S> {
    /// Advances one frame. Every noise request is made before any state
    /// changes, so a failed step leaves the engine as it was.
    fn step(&mut self) -> Result<(), EngineError> {
        let mut stack = self.stack.clone();
        stack.shift(self.next_delta());
        if should_increment_zoom(stack.master()) {
            let next = self.regenerate(stack.master())?;
            let fresh = ViewportStack::new(Viewport::UNIT, stack.len());
            self.view = self.render(&next.tile, &fresh, self.zoom + 1)?;
            self.commit_zoom(next);
        } else {
            self.view = self.render(&self.tile, &stack, self.zoom)?;
            self.stack = stack;
        }
        self.frame += 1;
        debug!(
            "frame {}: zoom {}, viewport {:?}",
            self.frame,
            self.zoom,
            self.stack.master().bounds()
        );
        Ok(())
    }

    fn field(&self) -> &Field {
        &self.view
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "initial_frequency": p.initial_frequency,
            "octaves": p.octaves,
            "persistence": p.persistence,
            "lacunarity": p.lacunarity,
            "pan_speed": p.pan_speed,
            "zoom_speed": p.zoom_speed,
            "island_mask": p.island_mask,
            "segment_x0": p.segment.start.x(),
            "segment_y0": p.segment.start.y(),
            "segment_x1": p.segment.end.x(),
            "segment_y1": p.segment.end.y(),
        })
    }

    fn param_schema(&self) -> Value {
        let [x0, y0, x1, y1] = DEFAULT_SEGMENT;
        json!({
            "initial_frequency": {
                "type": "number",
                "default": DEFAULT_INITIAL_FREQUENCY,
                "min": 0.0,
                "max": 64.0,
                "description": "Noise frequency of the coarsest octave, in cycles per tile"
            },
            "octaves": {
                "type": "integer",
                "default": DEFAULT_OCTAVES,
                "min": 1,
                "max": MAX_OCTAVES,
                "description": "Number of noise octaves layered over the tile"
            },
            "persistence": {
                "type": "number",
                "default": DEFAULT_PERSISTENCE,
                "min": MIN_PERSISTENCE,
                "max": 1.0,
                "description": "Amplitude ratio between successive octaves"
            },
            "lacunarity": {
                "type": "number",
                "default": DEFAULT_LACUNARITY,
                "min": 1.0,
                "max": 4.0,
                "description": "On-screen frequency ratio between successive octaves"
            },
            "pan_speed": {
                "type": "number",
                "default": DEFAULT_PAN_SPEED,
                "min": 0.0,
                "max": 8.0,
                "description": "Pixels panned toward the target each frame"
            },
            "zoom_speed": {
                "type": "number",
                "default": DEFAULT_ZOOM_SPEED,
                "min": 0.0,
                "max": 8.0,
                "description": "Pixels of the longer side each viewport edge moves inward each frame"
            },
            "island_mask": {
                "type": "boolean",
                "default": true,
                "description": "Start from a single central island instead of sea level"
            },
            "segment_x0": {
                "type": "number",
                "default": x0,
                "min": 0.0,
                "max": 1.0,
                "description": "Coastline search start, tile x"
            },
            "segment_y0": {
                "type": "number",
                "default": y0,
                "min": 0.0,
                "max": 1.0,
                "description": "Coastline search start, tile y"
            },
            "segment_x1": {
                "type": "number",
                "default": x1,
                "min": 0.0,
                "max": 1.0,
                "description": "Coastline search end, tile x"
            },
            "segment_y1": {
                "type": "number",
                "default": y1,
                "min": 0.0,
                "max": 1.0,
                "description": "Coastline search end, tile y"
            }
        })
    }

    fn marker(&self) -> Option<PixelCoord> {
        let master = self.stack.master();
        master
            .contains(self.target)
            .then(|| master.to_pixel(self.target, self.res))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use island_zoom_core::GradientNoise;
    use std::cell::RefCell;

    const EPS: f64 = 1e-12;

    /// Constant noise that records every request.
    struct RecordingSource {
        value: f64,
        calls: RefCell<Vec<(Viewport, f64, u32)>>,
    }

    impl RecordingSource {
        fn new(value: f64) -> Self {
            Self {
                value,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl NoiseSource for RecordingSource {
        fn name(&self) -> &str {
            "recording"
        }

        fn generate(
            &self,
            res: Resolution,
            viewport: &Viewport,
            frequency: f64,
            seed: u32,
        ) -> Result<Field, EngineError> {
            self.calls.borrow_mut().push((*viewport, frequency, seed));
            Field::filled(res.width, res.height, self.value)
        }
    }

    /// Succeeds `remaining` times, then fails like a crashed generator.
    struct FlakySource {
        remaining: RefCell<usize>,
    }

    impl NoiseSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        fn generate(
            &self,
            res: Resolution,
            _viewport: &Viewport,
            _frequency: f64,
            _seed: u32,
        ) -> Result<Field, EngineError> {
            let mut remaining = self.remaining.borrow_mut();
            if *remaining == 0 {
                return Err(EngineError::External {
                    command: "gradient_noise".into(),
                    reason: "exit status: 1".into(),
                });
            }
            *remaining -= 1;
            Ok(Field::zeros(res))
        }
    }

    fn quiet(w: usize, h: usize, params: ZoomParams) -> ZoomEngine<RecordingSource> {
        ZoomEngine::new(w, h, 7, params, RecordingSource::new(0.0)).unwrap()
    }

    // ---- Construction tests ----

    #[test]
    fn new_starts_at_zoom_zero_with_unit_viewport() {
        let engine = quiet(16, 16, ZoomParams::default());
        assert_eq!(engine.zoom(), 0);
        assert_eq!(engine.frame(), 0);
        assert_eq!(*engine.viewport(), Viewport::UNIT);
        assert_eq!(engine.stack().len(), DEFAULT_OCTAVES);
        assert_eq!(engine.field().width(), 16);
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        let result = ZoomEngine::new(0, 16, 1, ZoomParams::default(), GradientNoise);
        assert!(matches!(result, Err(EngineError::InvalidDimensions)));
    }

    #[test]
    fn new_propagates_noise_failure() {
        let source = FlakySource {
            remaining: RefCell::new(0),
        };
        let result = ZoomEngine::new(8, 8, 1, ZoomParams::default(), source);
        assert!(matches!(result, Err(EngineError::External { .. })));
    }

    #[test]
    fn initial_target_lies_on_the_coastline_segment() {
        // With silent noise the view is the island mask; the segment runs
        // from the land centre to the sea at the top edge.
        let engine = quiet(64, 64, ZoomParams::default());
        let t = engine.target();
        assert!(t.x() > 0.5 && t.x() < 0.75, "target {t:?}");
        assert!(t.y() > 0.5 && t.y() < 1.0, "target {t:?}");
        let seg = engine.segment();
        let along = (t.0 - seg.start.0).perp_dot(seg.end.0 - seg.start.0);
        assert!(along.abs() < 1e-9, "target {t:?} is off the segment");
    }

    #[test]
    fn flat_sea_falls_back_to_viewport_centre() {
        let params = ZoomParams {
            island_mask: false,
            ..ZoomParams::default()
        };
        let engine = quiet(8, 8, params);
        assert_eq!(engine.target(), Viewport::UNIT.center());
    }

    #[test]
    fn zoom_speed_is_clamped_to_quarter_of_long_side() {
        let params = ZoomParams {
            zoom_speed: 100.0,
            ..ZoomParams::default()
        };
        let engine = quiet(16, 8, params);
        assert_eq!(engine.zoom_params().zoom_speed, 4.0);
    }

    #[test]
    fn from_json_reads_and_clamps() {
        let p = ZoomParams::from_json(&json!({
            "octaves": 99,
            "persistence": 3.0,
            "pan_speed": -1.0,
            "island_mask": false,
            "segment_x1": 0.1
        }));
        assert_eq!(p.octaves, MAX_OCTAVES);
        assert_eq!(p.persistence, 1.0);
        assert_eq!(p.pan_speed, 0.0);
        assert!(!p.island_mask);
        assert_eq!(p.segment.end.x(), 0.1);
        assert_eq!(p.initial_frequency, DEFAULT_INITIAL_FREQUENCY);
    }

    #[test]
    fn octave_amplitude_and_frequency() {
        let p = ZoomParams::default();
        assert_eq!(p.amplitude(0), 1.0);
        assert_eq!(p.amplitude(2), 0.25);
        assert_eq!(p.frequency(0), 4.0);
        assert_eq!(p.frequency(1), 16.0);
    }

    // ---- Rendering tests ----

    #[test]
    fn render_requests_one_layer_per_octave_with_seeds_and_frequencies() {
        let engine = quiet(8, 8, ZoomParams::default());
        let calls = engine.source().calls.borrow();
        assert_eq!(calls.len(), DEFAULT_OCTAVES);
        for (i, (vp, freq, seed)) in calls.iter().enumerate() {
            assert_eq!(*vp, engine.stack().layers()[i]);
            assert_eq!(*freq, engine.zoom_params().frequency(i));
            assert_eq!(*seed, 7 + i as u32);
        }
    }

    #[test]
    fn view_sums_octave_amplitudes() {
        let params = ZoomParams {
            island_mask: false,
            octaves: 3,
            ..ZoomParams::default()
        };
        let engine = ZoomEngine::new(4, 4, 0, params, RecordingSource::new(1.0)).unwrap();
        assert!(engine
            .field()
            .data()
            .iter()
            .all(|&v| (v - 1.75).abs() < EPS));
    }

    #[test]
    fn builtin_noise_is_reproducible() {
        let mut a = ZoomEngine::new(24, 16, 42, ZoomParams::default(), GradientNoise).unwrap();
        let mut b = ZoomEngine::new(24, 16, 42, ZoomParams::default(), GradientNoise).unwrap();
        for _ in 0..5 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.field(), b.field());
        assert_eq!(a.viewport(), b.viewport());
    }

    // ---- Motion and zoom tests ----

    #[test]
    fn should_increment_requires_both_axes_below_half() {
        let vp = |w: f64, h: f64| Viewport::new(TileCoord::new(0.0, 0.0), TileCoord::new(w, h));
        assert!(should_increment_zoom(&vp(0.49, 0.49)));
        assert!(!should_increment_zoom(&vp(0.5, 0.49)));
        assert!(!should_increment_zoom(&vp(0.49, 0.6)));
        assert!(!should_increment_zoom(&Viewport::UNIT));
    }

    #[test]
    fn step_shrinks_master_viewport() {
        let mut engine = quiet(32, 32, ZoomParams::default());
        let before = engine.viewport().extent();
        engine.step().unwrap();
        let after = engine.viewport().extent();
        assert!(after.x < before.x && after.y < before.y);
        assert_eq!(engine.frame(), 1);
    }

    #[test]
    fn zoom_increments_exactly_once_when_extent_drops_below_half() {
        // 2 px per edge on 8 px halves the extent each frame: 1.0, 0.5, 0.25.
        let params = ZoomParams {
            zoom_speed: 2.0,
            pan_speed: 0.0,
            ..ZoomParams::default()
        };
        let mut engine = quiet(8, 8, params);
        engine.step().unwrap();
        assert_eq!(engine.zoom(), 0);
        assert!(engine.viewport().extent().abs_diff_eq(DVec2::splat(0.5), EPS));

        engine.step().unwrap();
        assert_eq!(engine.zoom(), 1);
        assert_eq!(*engine.viewport(), Viewport::UNIT);

        engine.step().unwrap();
        assert_eq!(engine.zoom(), 1);
    }

    #[test]
    fn increment_remaps_target_and_segment_through_old_viewport() {
        let mut engine = quiet(16, 16, ZoomParams::default());
        for _ in 0..3 {
            engine.advance_frame();
        }
        let old = *engine.viewport();
        let target = engine.target();
        let segment = *engine.segment();

        engine.increment_zoom().unwrap();
        let expected = (target.0 - old.min.0) / old.extent();
        assert!(engine.target().0.abs_diff_eq(expected, EPS));
        assert!(engine
            .segment()
            .start
            .0
            .abs_diff_eq((segment.start.0 - old.min.0) / old.extent(), EPS));
        assert_eq!(engine.stack(), &ViewportStack::new(Viewport::UNIT, DEFAULT_OCTAVES));
    }

    #[test]
    fn increment_builds_tile_from_old_view_and_first_octave() {
        let params = ZoomParams {
            island_mask: false,
            ..ZoomParams::default()
        };
        let mut engine = ZoomEngine::new(8, 8, 3, params, RecordingSource::new(0.25)).unwrap();
        engine.advance_frame();
        let old = *engine.viewport();
        engine.source().calls.borrow_mut().clear();

        engine.increment_zoom().unwrap();
        assert!(engine.tile().data().iter().all(|&v| (v - 0.25).abs() < EPS));
        let calls = engine.source().calls.borrow();
        assert_eq!(calls.as_slice(), &[(old, engine.zoom_params().frequency(0), 3)]);
    }

    #[test]
    fn seeds_advance_with_zoom_level() {
        let mut engine = quiet(8, 8, ZoomParams::default());
        engine.increment_zoom().unwrap();
        engine.source().calls.borrow_mut().clear();
        engine.render_view().unwrap();
        let seeds: Vec<u32> = engine.source().calls.borrow().iter().map(|c| c.2).collect();
        assert_eq!(seeds, vec![8, 9, 10, 11]);
    }

    #[test]
    fn noise_failure_during_step_is_fatal() {
        let source = FlakySource {
            remaining: RefCell::new(DEFAULT_OCTAVES),
        };
        let mut engine = ZoomEngine::new(8, 8, 1, ZoomParams::default(), source).unwrap();
        let before = engine.field().clone();
        assert!(matches!(engine.step(), Err(EngineError::External { .. })));
        assert_eq!(engine.frame(), 0);
        assert_eq!(engine.field(), &before);
        assert_eq!(engine.stack(), &ViewportStack::new(Viewport::UNIT, DEFAULT_OCTAVES));
    }

    #[test]
    fn noise_failure_on_zoom_frame_leaves_tile_and_stack() {
        // 2 px per edge on 8 px: the second step crosses the threshold and
        // needs one tile octave plus a full render.
        let params = ZoomParams {
            zoom_speed: 2.0,
            pan_speed: 0.0,
            ..ZoomParams::default()
        };
        let source = FlakySource {
            remaining: RefCell::new(2 * DEFAULT_OCTAVES + 2),
        };
        let mut engine = ZoomEngine::new(8, 8, 1, params, source).unwrap();
        engine.step().unwrap();
        let stack = engine.stack().clone();
        let tile = engine.tile().clone();
        let target = engine.target();

        assert!(matches!(engine.step(), Err(EngineError::External { .. })));
        assert_eq!(engine.zoom(), 0);
        assert_eq!(engine.frame(), 1);
        assert_eq!(engine.stack(), &stack);
        assert_eq!(engine.tile(), &tile);
        assert_eq!(engine.target(), target);
    }

    #[test]
    fn step_matches_manual_advance_and_render() {
        let mut stepped = ZoomEngine::new(24, 10, 5, ZoomParams::default(), GradientNoise).unwrap();
        let mut manual = ZoomEngine::new(24, 10, 5, ZoomParams::default(), GradientNoise).unwrap();
        for _ in 0..30 {
            stepped.step().unwrap();
            let viewport = manual.advance_frame();
            if should_increment_zoom(&viewport) {
                manual.increment_zoom().unwrap();
            }
            let view = manual.render_view().unwrap();
            assert_eq!(stepped.stack(), manual.stack());
            assert_eq!(stepped.field(), &view);
        }
    }

    #[test]
    fn wide_frame_keeps_octave_layers_nested() {
        let params = ZoomParams {
            pan_speed: 1.0,
            zoom_speed: 1.0,
            ..ZoomParams::default()
        };
        let mut engine = ZoomEngine::new(64, 16, 42, params, GradientNoise).unwrap();
        for frame in 0..80 {
            engine.step().unwrap();
            for pair in engine.stack().layers().windows(2) {
                assert!(
                    pair[0].covers(&pair[1], 1e-9),
                    "frame {frame} zoom {}: {:?} does not cover {:?}",
                    engine.zoom(),
                    pair[0].bounds(),
                    pair[1].bounds()
                );
            }
        }
        assert!(engine.zoom() >= 1, "no zoom increment in 80 frames");
    }

    // ---- Marker and parameter tests ----

    #[test]
    fn marker_tracks_target_in_pixels() {
        let engine = quiet(32, 32, ZoomParams::default());
        let m = engine.marker().unwrap();
        let back = engine.viewport().to_tile(m, engine.resolution());
        assert!(back.0.abs_diff_eq(engine.target().0, 1e-9));
    }

    #[test]
    fn params_round_trip_through_json() {
        let engine = quiet(8, 8, ZoomParams::default());
        let restored = ZoomParams::from_json(&engine.params());
        assert_eq!(&restored, engine.zoom_params());
    }

    #[test]
    fn param_schema_covers_every_param() {
        let engine = quiet(8, 8, ZoomParams::default());
        let schema = engine.param_schema();
        for key in engine.params().as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "missing schema for {key}");
        }
    }

    #[test]
    fn engine_is_usable_as_trait_object() {
        let mut engine: Box<dyn Engine> = Box::new(quiet(8, 8, ZoomParams::default()));
        engine.step().unwrap();
        assert_eq!(engine.field().height(), 8);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn viewport_stays_inside_tile_across_zooms(
                seed in any::<u64>(),
                zoom_speed in 0.5_f64..3.0,
                pan_speed in 0.0_f64..3.0,
                w in 6_usize..40,
                h in 6_usize..40,
            ) {
                let params = ZoomParams { zoom_speed, pan_speed, ..ZoomParams::default() };
                let mut engine = ZoomEngine::new(w, h, seed, params, GradientNoise).unwrap();
                let mut zoom = 0;
                for _ in 0..20 {
                    engine.step().unwrap();
                    prop_assert!(Viewport::UNIT.covers(engine.viewport(), 1e-9));
                    prop_assert!(engine.zoom() == zoom || engine.zoom() == zoom + 1);
                    for pair in engine.stack().layers().windows(2) {
                        prop_assert!(pair[0].covers(&pair[1], 1e-9), "{:?}", pair);
                    }
                    zoom = engine.zoom();
                }
            }
        }
    }
}
