//! Viewport resampling and zero-crossing search over a [`Field`].

use crate::coords::{PixelCoord, Resolution, Viewport};
use crate::field::Field;

/// Sample positions closer than this to a cell centre snap onto it, so
/// resampling the unit viewport at the source's own resolution is exact.
const SNAP_EPS: f64 = 1e-9;

/// Three-way sign of a height. Zero is its own class: a sample that lands
/// exactly on zero counts as the coastline itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignClass {
    Negative,
    Zero,
    Positive,
}

impl SignClass {
    /// NaN is classified as `Zero`.
    pub fn of(v: f64) -> Self {
        if v > 0.0 {
            SignClass::Positive
        } else if v < 0.0 {
            SignClass::Negative
        } else {
            SignClass::Zero
        }
    }
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPS {
        r
    } else {
        v
    }
}

/// Bilinearly resamples `source`, which spans the unit tile, into a field of
/// `res` covering exactly `viewport`.
///
/// `viewport` must lie within `[0,1]²`. Outside that domain the result is
/// unspecified (sample positions are clamped to the source edges).
pub fn resample(source: &Field, viewport: &Viewport, res: Resolution) -> Field {
    let sw = source.width() as f64;
    let sh = source.height() as f64;
    Field::from_fn(res, |col, row| {
        let p = viewport.pixel_center(row, col, res);
        let sx = snap(p.x() * sw - 0.5);
        let sy = snap((1.0 - p.y()) * sh - 0.5);
        source.bilinear(sx, sy)
    })
}

/// Value of the pixel containing `p`.
pub fn sample_nearest(field: &Field, p: PixelCoord) -> f64 {
    let (x, y) = p.nearest(field.resolution());
    field.get(x, y)
}

/// Marches from `start` toward `end` (exclusive) in `max(width, height)`
/// equal steps and returns the first sample whose [`SignClass`] differs
/// from the one at `start`.
///
/// The crossing is not refined between steps. Returns `None` if the sign
/// never changes.
pub fn march_line(field: &Field, start: PixelCoord, end: PixelCoord) -> Option<PixelCoord> {
    let divs = field.resolution().max_side();
    let initial = SignClass::of(sample_nearest(field, start));
    (0..divs)
        .map(|k| start.lerp(end, k as f64 / divs as f64))
        .find(|&p| SignClass::of(sample_nearest(field, p)) != initial)
}
