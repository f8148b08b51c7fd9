//! Pure-computation pixel buffer conversion from [`Field`] + [`Palette`].
//!
//! Always available (no feature gate) so frames can be inspected or encoded
//! by callers that do not want the `png` path.

use island_zoom_core::{Engine, Field, Palette, PixelCoord, Resolution, Rgb8};

/// Color of the target marker ring.
pub const MARKER_COLOR: Rgb8 = Rgb8 { r: 255, g: 0, b: 0 };

/// Maps signed heights through a palette to produce an RGBA8 pixel buffer.
///
/// Height `h` samples the palette at `0.5 + 0.5·h`, so `[-1, 1]` spans the
/// whole gradient. The buffer length is `width * height * 4`.
pub fn field_to_rgba(field: &Field, palette: &Palette) -> Vec<u8> {
    field
        .data()
        .iter()
        .flat_map(|&h| {
            let c = palette.sample_height(h);
            [c.r, c.g, c.b, 255u8]
        })
        .collect()
}

/// Strokes an anti-aliased ring centred on `center` into an RGBA buffer.
///
/// The radius is `1/60` of the image size on each axis and the stroke is
/// `width / 150` pixels wide (at least one pixel).
pub fn splat_ring(rgba: &mut [u8], res: Resolution, center: PixelCoord, color: Rgb8) {
    let radius_x = res.width as f64 / 60.0;
    let radius_y = res.height as f64 / 60.0;
    let radius = 0.5 * (radius_x + radius_y);
    let half_stroke = (res.width as f64 / 150.0).max(1.0) * 0.5;
    let reach = radius_x.max(radius_y) + half_stroke + 1.0;

    let rows = span(center.row, reach, res.height);
    let cols = span(center.col, reach, res.width);
    for row in rows {
        for col in cols.clone() {
            let dx = (col as f64 + 0.5 - center.col) / radius_x;
            let dy = (row as f64 + 0.5 - center.row) / radius_y;
            let off_ring = ((dx * dx + dy * dy).sqrt() - 1.0).abs() * radius;
            let coverage = (half_stroke + 0.5 - off_ring).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend(&mut rgba[(row * res.width + col) * 4..][..3], color, coverage);
            }
        }
    }
}

/// Indices within `reach` of `center`, clipped to `0..n`.
fn span(center: f64, reach: f64, n: usize) -> std::ops::Range<usize> {
    let lo = (center - reach).floor().max(0.0) as usize;
    let hi = ((center + reach).ceil().max(0.0) as usize).min(n);
    lo.min(hi)..hi
}

fn blend(pixel: &mut [u8], color: Rgb8, coverage: f64) {
    for (channel, target) in pixel.iter_mut().zip([color.r, color.g, color.b]) {
        let mixed = *channel as f64 + (target as f64 - *channel as f64) * coverage;
        *channel = mixed.round() as u8;
    }
}

/// Renders an engine's current frame, with its marker if it has one.
pub fn render_frame(engine: &dyn Engine, palette: &Palette) -> Vec<u8> {
    let field = engine.field();
    let mut rgba = field_to_rgba(field, palette);
    if let Some(marker) = engine.marker() {
        splat_ring(&mut rgba, field.resolution(), marker, MARKER_COLOR);
    }
    rgba
}
