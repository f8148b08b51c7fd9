//! Coordinate frames used by the zoom engine.
//!
//! Two frames meet at every boundary and are kept apart by type:
//!
//! - [`TileCoord`]: `x` right, `y` up. `[0,0]–[1,1]` spans the cached tile.
//!   Viewports, targets and line segments live here.
//! - [`PixelCoord`]: `row` down, `col` right, continuous. Pixel `(r, c)`
//!   covers `[r, r+1) × [c, c+1)`, so its centre is `(r + 0.5, c + 0.5)`.
//!
//! A [`Viewport`] together with a [`Resolution`] is the only way to convert
//! between the two.

use crate::error::EngineError;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Output raster size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

impl Resolution {
    /// Returns `EngineError::InvalidDimensions` if either side is zero or the
    /// pixel count overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        width
            .checked_mul(height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(Self { width, height })
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false for a validated resolution.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The larger of the two sides.
    pub fn max_side(&self) -> usize {
        self.width.max(self.height)
    }

    fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }
}

/// A point in tile space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileCoord(pub DVec2);

impl TileCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }
}

/// A continuous raster position, rows increasing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelCoord {
    pub row: f64,
    pub col: f64,
}

impl PixelCoord {
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Index `(col, row)` of the pixel containing this position, clamped to
    /// the raster.
    pub fn nearest(&self, res: Resolution) -> (usize, usize) {
        let clamp = |v: f64, n: usize| -> usize {
            if v.is_nan() || v < 0.0 {
                0
            } else {
                (v.floor() as usize).min(n - 1)
            }
        };
        (clamp(self.col, res.width), clamp(self.row, res.height))
    }

    /// Linear interpolation between two raster positions.
    pub fn lerp(self, other: PixelCoord, t: f64) -> PixelCoord {
        PixelCoord {
            row: self.row + (other.row - self.row) * t,
            col: self.col + (other.col - self.col) * t,
        }
    }
}

/// Per-edge displacement of a [`Viewport`].
///
/// Pan moves `min` and `max` together; zoom moves them toward each other.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportDelta {
    pub min: DVec2,
    pub max: DVec2,
}

impl ViewportDelta {
    /// A pure translation by `offset`.
    pub fn translation(offset: DVec2) -> Self {
        Self {
            min: offset,
            max: offset,
        }
    }

    /// A symmetric inward move of `inset` on every edge.
    pub fn inset(inset: DVec2) -> Self {
        Self {
            min: inset,
            max: -inset,
        }
    }

    /// Change in viewport extent this delta produces.
    pub fn extent_change(&self) -> DVec2 {
        self.max - self.min
    }
}

impl Add for ViewportDelta {
    type Output = ViewportDelta;

    fn add(self, rhs: ViewportDelta) -> ViewportDelta {
        ViewportDelta {
            min: self.min + rhs.min,
            max: self.max + rhs.max,
        }
    }
}

impl Mul<f64> for ViewportDelta {
    type Output = ViewportDelta;

    fn mul(self, rhs: f64) -> ViewportDelta {
        ViewportDelta {
            min: self.min * rhs,
            max: self.max * rhs,
        }
    }
}

/// An axis-aligned rectangle in tile space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min: TileCoord,
    pub max: TileCoord,
}

impl Viewport {
    /// The whole tile, `[0,0]–[1,1]`.
    pub const UNIT: Viewport = Viewport {
        min: TileCoord(DVec2::ZERO),
        max: TileCoord(DVec2::ONE),
    };

    pub fn new(min: TileCoord, max: TileCoord) -> Self {
        Self { min, max }
    }

    pub fn extent(&self) -> DVec2 {
        self.max.0 - self.min.0
    }

    pub fn center(&self) -> TileCoord {
        TileCoord((self.min.0 + self.max.0) * 0.5)
    }

    /// Corners as `[left, bottom, right, top]`.
    pub fn bounds(&self) -> [f64; 4] {
        [self.min.x(), self.min.y(), self.max.x(), self.max.y()]
    }

    /// Whether `other` lies entirely inside this viewport, with tolerance `eps`.
    pub fn covers(&self, other: &Viewport, eps: f64) -> bool {
        other.min.0.cmpge(self.min.0 - eps).all() && other.max.0.cmple(self.max.0 + eps).all()
    }

    /// Whether `p` lies inside the viewport (edges included).
    pub fn contains(&self, p: TileCoord) -> bool {
        p.0.cmpge(self.min.0).all() && p.0.cmple(self.max.0).all()
    }

    /// Width and height of one output pixel in tile units.
    pub fn pixel_size(&self, res: Resolution) -> DVec2 {
        self.extent() / res.as_dvec2()
    }

    /// Tile-space position of a raster position inside this viewport.
    pub fn to_tile(&self, p: PixelCoord, res: Resolution) -> TileCoord {
        let ext = self.extent();
        TileCoord::new(
            self.min.x() + p.col / res.width as f64 * ext.x,
            self.max.y() - p.row / res.height as f64 * ext.y,
        )
    }

    /// Raster position of a tile-space point, relative to this viewport.
    pub fn to_pixel(&self, p: TileCoord, res: Resolution) -> PixelCoord {
        let ext = self.extent();
        PixelCoord::new(
            (self.max.y() - p.y()) / ext.y * res.height as f64,
            (p.x() - self.min.x()) / ext.x * res.width as f64,
        )
    }

    /// Tile-space centre of pixel `(row, col)`.
    pub fn pixel_center(&self, row: usize, col: usize, res: Resolution) -> TileCoord {
        self.to_tile(PixelCoord::new(row as f64 + 0.5, col as f64 + 0.5), res)
    }

    /// Re-expresses `p` in the frame where this viewport is the unit square.
    pub fn normalize(&self, p: TileCoord) -> TileCoord {
        TileCoord((p.0 - self.min.0) / self.extent())
    }

    pub fn apply(&self, delta: ViewportDelta) -> Viewport {
        Viewport {
            min: TileCoord(self.min.0 + delta.min),
            max: TileCoord(self.max.0 + delta.max),
        }
    }

    /// Scales the viewport by `factor` about `anchor`.
    pub fn contract_toward(&self, anchor: TileCoord, factor: f64) -> Viewport {
        Viewport {
            min: TileCoord(anchor.0 + (self.min.0 - anchor.0) * factor),
            max: TileCoord(anchor.0 + (self.max.0 - anchor.0) * factor),
        }
    }
}

/// A line segment in tile space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: TileCoord,
    pub end: TileCoord,
}

impl LineSegment {
    pub fn new(start: TileCoord, end: TileCoord) -> Self {
        Self { start, end }
    }

    /// Remaps both endpoints into the frame where `viewport` is the unit square.
    pub fn normalize(&self, viewport: &Viewport) -> LineSegment {
        LineSegment {
            start: viewport.normalize(self.start),
            end: viewport.normalize(self.end),
        }
    }
}
