//! Two-dimensional scalar height field.
//!
//! A `Field` stores `width * height` f64 heights in row-major layout with
//! row 0 at the top. Heights are signed: negative is sea, positive is land,
//! and zero is the coastline. Unlike a normalized intensity grid, values are
//! never clamped, because octaves are summed on top of each other.

use crate::coords::Resolution;
use crate::error::EngineError;

/// A 2D grid of signed heights.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Field {
    /// Creates a zero-filled field of the given dimensions.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Self::filled(width, height, 0.0)
    }

    /// Creates a field with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, EngineError> {
        let res = Resolution::new(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; res.len()],
        })
    }

    /// Creates a zero-filled field matching `res`.
    pub fn zeros(res: Resolution) -> Self {
        Self {
            width: res.width,
            height: res.height,
            data: vec![0.0; res.len()],
        }
    }

    /// Creates a field by evaluating `f(col, row)` for every cell.
    pub fn from_fn(res: Resolution, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let data = (0..res.height)
            .flat_map(|row| (0..res.width).map(move |col| (col, row)))
            .map(|(col, row)| f(col, row))
            .collect();
        Self {
            width: res.width,
            height: res.height,
            data,
        }
    }

    /// Creates a field from a pre-built row-major data vector, validating
    /// that `data.len() == width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, EngineError> {
        let res = Resolution::new(width, height)?;
        if data.len() != res.len() {
            return Err(EngineError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Field width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Field height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Gets the value at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the field.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x]
    }

    /// Gets the value at `(x, y)` with both indices clamped to the field edges.
    pub fn get_clamped(&self, x: isize, y: isize) -> f64 {
        let xi = x.clamp(0, self.width as isize - 1) as usize;
        let yi = y.clamp(0, self.height as isize - 1) as usize;
        self.data[yi * self.width + xi]
    }

    /// Sets the value at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the field.
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x] = value;
    }

    /// Bilinear interpolation at fractional column `x`, row `y`, where
    /// integer positions are cell centres. Positions beyond the outermost
    /// centres take the edge value.
    pub fn bilinear(&self, x: f64, y: f64) -> f64 {
        let x = x.clamp(0.0, (self.width - 1) as f64);
        let y = y.clamp(0.0, (self.height - 1) as f64);
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);

        let v00 = self.get_clamped(x0, y0);
        let v10 = self.get_clamped(x0 + 1, y0);
        let v01 = self.get_clamped(x0, y0 + 1);
        let v11 = self.get_clamped(x0 + 1, y0 + 1);

        let top = v00 + (v10 - v00) * fx;
        let bottom = v01 + (v11 - v01) * fx;
        top + (bottom - top) * fy
    }

    fn check_same_size(&self, other: &Field) -> Result<(), EngineError> {
        if self.width != other.width || self.height != other.height {
            return Err(EngineError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: other.width,
                rhs_h: other.height,
            });
        }
        Ok(())
    }

    /// In-place element-wise addition.
    ///
    /// Returns `EngineError::DimensionMismatch` if the fields differ in size.
    pub fn add_assign(&mut self, other: &Field) -> Result<(), EngineError> {
        self.add_scaled_assign(other, 1.0)
    }

    /// In-place `self += amplitude * other`, the octave accumulation step.
    ///
    /// Returns `EngineError::DimensionMismatch` if the fields differ in size.
    pub fn add_scaled_assign(&mut self, other: &Field, amplitude: f64) -> Result<(), EngineError> {
        self.check_same_size(other)?;
        self.data
            .iter_mut()
            .zip(other.data.iter())
            .for_each(|(a, b)| *a += b * amplitude);
        Ok(())
    }

    /// In-place scaling of all values by `factor`.
    pub fn scale_assign(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }

    /// Smallest and largest value, ignoring NaN.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Iterates over all cells yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}
