//! Height-to-color gradients.
//!
//! A [`Palette`] is a list of color stops along `t ∈ [0, 1]`, sampled by
//! linear interpolation in sRGB. Heights map to `t = 0.5 + 0.5·h`, so the
//! coastline (`h = 0`) sits in the middle of every palette.

use crate::error::EngineError;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Parses a hex color string like "#2c5a7c" or "2C5A7C".
    ///
    /// Returns `EngineError::InvalidColor` if the input is not 6 hex digits.
    pub fn from_hex(hex: &str) -> Result<Rgb8, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got {hex:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Rgb8 {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    fn lerp(self, other: Rgb8, t: f64) -> Rgb8 {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb8 {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

const PALETTE_NAMES: &[&str] = &["island", "classic", "grayscale"];

/// Color stops sampled by linear interpolation.
#[derive(Debug, Clone)]
pub struct Palette {
    stops: Vec<(f64, Rgb8)>,
}

impl Palette {
    /// Creates a palette from `(t, color)` stops.
    ///
    /// Stops must be non-empty with non-decreasing `t` in `[0, 1]`.
    pub fn new(stops: Vec<(f64, Rgb8)>) -> Result<Self, EngineError> {
        if stops.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette requires at least 1 stop".to_string(),
            ));
        }
        if stops.iter().any(|(t, _)| !(0.0..=1.0).contains(t)) {
            return Err(EngineError::InvalidPalette(
                "stop positions must lie in [0, 1]".to_string(),
            ));
        }
        if stops.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(EngineError::InvalidPalette(
                "stop positions must be non-decreasing".to_string(),
            ));
        }
        Ok(Self { stops })
    }

    /// Builds a palette from 8-bit stop indices (0–255) and hex colors.
    pub fn from_byte_stops(stops: &[(u8, &str)]) -> Result<Self, EngineError> {
        let stops = stops
            .iter()
            .map(|&(i, hex)| Ok((i as f64 / 255.0, Rgb8::from_hex(hex)?)))
            .collect::<Result<Vec<_>, EngineError>>()?;
        Self::new(stops)
    }

    /// Looks up a built-in palette by name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "island" => Ok(Self::island()),
            "classic" => Ok(Self::classic()),
            "grayscale" => Ok(Self::grayscale()),
            _ => Err(EngineError::InvalidPalette(format!(
                "unknown palette '{name}' (expected one of: {})",
                PALETTE_NAMES.join(", ")
            ))),
        }
    }

    /// Names accepted by [`Palette::from_name`].
    pub fn list_names() -> &'static [&'static str] {
        PALETTE_NAMES
    }

    /// Samples the palette at `t`, clamped to [0, 1]. NaN samples the first stop.
    pub fn sample(&self, t: f64) -> Rgb8 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let upper = self.stops.partition_point(|(s, _)| *s <= t);
        if upper == 0 {
            return self.stops[0].1;
        }
        if upper == self.stops.len() {
            return self.stops[upper - 1].1;
        }
        let (t0, c0) = self.stops[upper - 1];
        let (t1, c1) = self.stops[upper];
        if t1 <= t0 {
            return c1;
        }
        c0.lerp(c1, (t - t0) / (t1 - t0))
    }

    /// Samples the color for a signed height, where `[-1, 1]` spans the palette.
    pub fn sample_height(&self, h: f64) -> Rgb8 {
        self.sample(0.5 + 0.5 * h)
    }

    // -- Built-in palettes --

    /// Deep sea, shallows, a thin beach, then grass, hills and snow.
    pub fn island() -> Self {
        Self::from_byte_stops(&[
            (0, "#001070"),
            (126, "#2c5a7c"),
            (127, "#e0f0a0"),
            (128, "#5d943c"),
            (160, "#606011"),
            (200, "#ffffff"),
            (255, "#ffffff"),
        ])
        .expect("island palette stops are valid")
    }

    /// Blue ramp below sea level, green ramp above.
    pub fn classic() -> Self {
        Self::from_byte_stops(&[
            (0, "#000080"),
            (127, "#0000ff"),
            (128, "#008000"),
            (255, "#00ff40"),
        ])
        .expect("classic palette stops are valid")
    }

    /// Black to white.
    pub fn grayscale() -> Self {
        Self::from_byte_stops(&[(0, "#000000"), (255, "#ffffff")])
            .expect("grayscale palette stops are valid")
    }
}
