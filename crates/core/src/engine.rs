//! The core `Engine` trait that every frame generator implements.
//!
//! The trait is object-safe so engines can be used as `dyn Engine` for runtime
//! switching between the zoom animation and plain noise visualisation.

use crate::coords::PixelCoord;
use crate::error::EngineError;
use crate::field::Field;
use serde_json::Value;

/// A frame-by-frame height field generator.
///
/// Each `step` advances the animation by one frame and leaves the new frame
/// in [`Engine::field`], which the rendering pipeline maps to pixels via a
/// [`Palette`](crate::palette::Palette).
pub trait Engine {
    /// Advance by one frame.
    ///
    /// Returns an `EngineError` if the frame cannot be produced, most
    /// notably when the noise source fails.
    fn step(&mut self) -> Result<(), EngineError>;

    /// The current frame.
    fn field(&self) -> &Field;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types and defaults.
    fn param_schema(&self) -> Value;

    /// Raster position of a point of interest to draw over the frame.
    ///
    /// Returns `None` by default.
    fn marker(&self) -> Option<PixelCoord> {
        None
    }
}
