//! CPU-side PNG rendering of engine frames.
//!
//! Feature-gated behind `png` (default on) so the registry can be used
//! without pulling in the `image` crate. The pixel buffer conversion itself
//! lives in [`crate::pixel`] (always available).

use island_zoom_core::{Engine, EngineError, Palette, Resolution};
use std::path::Path;

use crate::pixel::render_frame;

/// File name of frame `index` for `engine`, e.g. `island_0007.png`.
pub fn frame_file_name(engine: &str, index: usize) -> String {
    format!("{engine}_{index:04}.png")
}

/// Writes an RGBA8 buffer as a PNG, upscaled by an integer `scale` with
/// nearest-neighbour sampling.
///
/// Returns `EngineError::InvalidDimensions` if `scale` is zero or the scaled
/// size overflows `u32`, or `EngineError::Io` on write failure.
pub fn write_png(
    rgba: Vec<u8>,
    res: Resolution,
    scale: u32,
    path: &Path,
) -> Result<(), EngineError> {
    if scale == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let w = u32::try_from(res.width).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(res.height).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    let img = if scale == 1 {
        img
    } else {
        let sw = w.checked_mul(scale).ok_or(EngineError::InvalidDimensions)?;
        let sh = h.checked_mul(scale).ok_or(EngineError::InvalidDimensions)?;
        image::imageops::resize(&img, sw, sh, image::imageops::FilterType::Nearest)
    };
    img.save(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))
}

/// Renders the engine's current frame (with marker) and writes it as a PNG.
pub fn write_frame(
    engine: &dyn Engine,
    palette: &Palette,
    scale: u32,
    path: &Path,
) -> Result<(), EngineError> {
    let rgba = render_frame(engine, palette);
    write_png(rgba, engine.field().resolution(), scale, path)
}
