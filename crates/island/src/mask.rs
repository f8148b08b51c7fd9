//! Starting height field for zoom level zero.

use island_zoom_core::{Field, Resolution, Viewport};

/// Smoothstep-shaped falloff: 1 at `t = 0`, 0 at `|t| = 1`.
fn falloff(t: f64) -> f64 {
    let t = t.clamp(-1.0, 1.0);
    1.0 - (3.0 - 2.0 * t.abs()) * t * t
}

/// A single island: positive in the middle of the tile, negative toward
/// the edges, with the coastline where `F(x)·F(y) = 0.5`.
pub fn island_mask(res: Resolution) -> Field {
    Field::from_fn(res, |col, row| {
        let p = Viewport::UNIT.pixel_center(row, col, res);
        falloff(2.0 * p.x() - 1.0) * falloff(2.0 * p.y() - 1.0) - 0.5
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_endpoints() {
        assert_eq!(falloff(0.0), 1.0);
        assert_eq!(falloff(1.0), 0.0);
        assert_eq!(falloff(-1.0), 0.0);
        assert_eq!(falloff(0.5), 0.5);
    }

    #[test]
    fn center_is_land_and_corners_are_sea() {
        let res = Resolution::new(33, 33).unwrap();
        let mask = island_mask(res);
        assert!(mask.get(16, 16) > 0.49);
        for (x, y) in [(0, 0), (32, 0), (0, 32), (32, 32)] {
            assert!(mask.get(x, y) < -0.49, "corner ({x},{y}) = {}", mask.get(x, y));
        }
    }

    #[test]
    fn mask_is_symmetric() {
        let res = Resolution::new(10, 6).unwrap();
        let mask = island_mask(res);
        for (x, y, v) in mask.iter() {
            let mirrored = mask.get(9 - x, 5 - y);
            assert!((v - mirrored).abs() < 1e-12);
        }
    }
}
