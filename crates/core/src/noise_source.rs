//! Noise sources: producers of one octave of gradient noise over a viewport.
//!
//! A [`NoiseSource`] is the single external capability the zoom engine
//! consumes. [`GradientNoise`] computes it in-process with the `noise`
//! crate; other crates provide backends that shell out to external tools.

use crate::coords::{Resolution, Viewport};
use crate::error::EngineError;
use crate::field::Field;
use noise::{NoiseFn, Perlin};

/// Generates one layer of noise sampled over a viewport.
///
/// Implementations must be deterministic: identical arguments produce an
/// identical field. Pixel `(row, col)` samples the tile-space point
/// `viewport.pixel_center(row, col, res)` scaled by `frequency`.
pub trait NoiseSource {
    /// Short backend name for logs and listings.
    fn name(&self) -> &str;

    /// Generates a `res`-sized field of noise over `viewport`.
    ///
    /// An error here is fatal to the run that requested the layer.
    fn generate(
        &self,
        res: Resolution,
        viewport: &Viewport,
        frequency: f64,
        seed: u32,
    ) -> Result<Field, EngineError>;
}

impl<T: NoiseSource + ?Sized> NoiseSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(
        &self,
        res: Resolution,
        viewport: &Viewport,
        frequency: f64,
        seed: u32,
    ) -> Result<Field, EngineError> {
        (**self).generate(res, viewport, frequency, seed)
    }
}

/// In-process Perlin gradient noise, roughly in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientNoise;

impl NoiseSource for GradientNoise {
    fn name(&self) -> &str {
        "builtin"
    }

    fn generate(
        &self,
        res: Resolution,
        viewport: &Viewport,
        frequency: f64,
        seed: u32,
    ) -> Result<Field, EngineError> {
        let perlin = Perlin::new(seed);
        Ok(Field::from_fn(res, |col, row| {
            let p = viewport.pixel_center(row, col, res).0 * frequency;
            perlin.get([p.x, p.y])
        }))
    }
}
