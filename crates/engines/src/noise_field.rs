//! Plain fractal noise that drifts sideways, for previewing a noise backend.

use glam::DVec2;
use island_zoom_core::params::{param_f64, param_usize};
use island_zoom_core::{
    Engine, EngineError, Field, NoiseSource, Resolution, Viewport, ViewportDelta,
};
use serde_json::{json, Value};

const DEFAULT_INITIAL_FREQUENCY: f64 = 4.0;
const DEFAULT_OCTAVES: usize = 4;
const DEFAULT_PERSISTENCE: f64 = 0.5;
const DEFAULT_LACUNARITY: f64 = 2.0;
/// Tile units the viewport moves right each frame.
const DEFAULT_DRIFT: f64 = 0.01;
const MAX_OCTAVES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseFieldParams {
    pub initial_frequency: f64,
    pub octaves: usize,
    pub persistence: f64,
    pub lacunarity: f64,
    pub drift: f64,
}

impl Default for NoiseFieldParams {
    fn default() -> Self {
        Self {
            initial_frequency: DEFAULT_INITIAL_FREQUENCY,
            octaves: DEFAULT_OCTAVES,
            persistence: DEFAULT_PERSISTENCE,
            lacunarity: DEFAULT_LACUNARITY,
            drift: DEFAULT_DRIFT,
        }
    }
}

impl NoiseFieldParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            initial_frequency: param_f64(params, "initial_frequency", DEFAULT_INITIAL_FREQUENCY),
            octaves: param_usize(params, "octaves", DEFAULT_OCTAVES).clamp(1, MAX_OCTAVES),
            persistence: param_f64(params, "persistence", DEFAULT_PERSISTENCE),
            lacunarity: param_f64(params, "lacunarity", DEFAULT_LACUNARITY),
            drift: param_f64(params, "drift", DEFAULT_DRIFT),
        }
    }
}

/// Sums octaves of noise over a viewport that slides along x.
///
/// Octave `i` has amplitude `persistence^i`, frequency
/// `initial_frequency · lacunarity^i` and seed `seed + i`.
pub struct NoiseField<S: NoiseSource> {
    source: S,
    params: NoiseFieldParams,
    res: Resolution,
    seed: u32,
    viewport: Viewport,
    field: Field,
}

impl<S: NoiseSource> NoiseField<S> {
    /// Renders the first frame over the unit viewport.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        params: NoiseFieldParams,
        source: S,
    ) -> Result<Self, EngineError> {
        let res = Resolution::new(width, height)?;
        let viewport = Viewport::UNIT;
        let field = octave_sum(&source, &params, res, &viewport, seed as u32)?;
        Ok(Self {
            source,
            params,
            res,
            seed: seed as u32,
            viewport,
            field,
        })
    }

    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        json_params: &Value,
        source: S,
    ) -> Result<Self, EngineError> {
        Self::new(width, height, seed, NoiseFieldParams::from_json(json_params), source)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

fn octave_sum<S: NoiseSource>(
    source: &S,
    params: &NoiseFieldParams,
    res: Resolution,
    viewport: &Viewport,
    seed: u32,
) -> Result<Field, EngineError> {
    let mut field = Field::zeros(res);
    let mut amplitude = 1.0;
    let mut frequency = params.initial_frequency;
    for i in 0..params.octaves {
        let layer = source.generate(res, viewport, frequency, seed.wrapping_add(i as u32))?;
        field.add_scaled_assign(&layer, amplitude)?;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }
    Ok(field)
}

impl<S: NoiseSource> Engine for NoiseField<S> {
    fn step(&mut self) -> Result<(), EngineError> {
        let next = self
            .viewport
            .apply(ViewportDelta::translation(DVec2::new(self.params.drift, 0.0)));
        self.field = octave_sum(&self.source, &self.params, self.res, &next, self.seed)?;
        self.viewport = next;
        Ok(())
    }

    fn field(&self) -> &Field {
        &self.field
    }

    fn params(&self) -> Value {
        json!({
            "initial_frequency": self.params.initial_frequency,
            "octaves": self.params.octaves,
            "persistence": self.params.persistence,
            "lacunarity": self.params.lacunarity,
            "drift": self.params.drift,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "initial_frequency": {
                "type": "number",
                "default": DEFAULT_INITIAL_FREQUENCY,
                "min": 0.0,
                "max": 64.0,
                "description": "Frequency of the first octave, in cycles per tile"
            },
            "octaves": {
                "type": "integer",
                "default": DEFAULT_OCTAVES,
                "min": 1,
                "max": MAX_OCTAVES,
                "description": "Number of octaves summed"
            },
            "persistence": {
                "type": "number",
                "default": DEFAULT_PERSISTENCE,
                "min": 0.0,
                "max": 1.0,
                "description": "Amplitude ratio between successive octaves"
            },
            "lacunarity": {
                "type": "number",
                "default": DEFAULT_LACUNARITY,
                "min": 1.0,
                "max": 4.0,
                "description": "Frequency ratio between successive octaves"
            },
            "drift": {
                "type": "number",
                "default": DEFAULT_DRIFT,
                "min": -0.1,
                "max": 0.1,
                "description": "Tile units the view slides right each frame"
            }
        })
    }
}
