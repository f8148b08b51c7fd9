//! Per-frame pan and zoom of the master viewport.

use glam::DVec2;
use island_zoom_core::{Resolution, TileCoord, Viewport, ViewportDelta};

/// Normalized target offsets below this magnitude do not pan that axis.
pub const PAN_DEAD_ZONE: f64 = 0.05;

/// Steering direction along one axis for a target offset normalized by the
/// viewport extent.
fn steer(offset: f64) -> f64 {
    if offset.is_nan() || offset.abs() < PAN_DEAD_ZONE {
        0.0
    } else {
        offset.signum()
    }
}

/// Translation that moves `moved` back inside the unit square on each axis.
fn unit_correction(moved: &Viewport) -> DVec2 {
    let axis = |lo: f64, hi: f64| {
        if lo < 0.0 {
            -lo
        } else if hi > 1.0 {
            1.0 - hi
        } else {
            0.0
        }
    };
    DVec2::new(
        axis(moved.min.x(), moved.max.x()),
        axis(moved.min.y(), moved.max.y()),
    )
}

/// Per-edge inset for one frame of zoom.
///
/// `zoom_speed` counts pixels along the longer side of the frame. Both axes
/// shrink by the same fraction of their extent, so a square viewport stays
/// square whatever the resolution.
fn zoom_inset(viewport: &Viewport, res: Resolution, zoom_speed: f64) -> DVec2 {
    viewport.extent() * (zoom_speed / res.max_side() as f64)
}

/// Delta for one frame: a symmetric inset of `zoom_speed` pixels per edge
/// plus a translation of `pan_speed` pixels toward `target`.
///
/// The focus is the viewport centre. The translation is corrected so the
/// viewport never leaves the tile; that correction never changes extent.
pub fn frame_delta(
    viewport: &Viewport,
    target: TileCoord,
    res: Resolution,
    pan_speed: f64,
    zoom_speed: f64,
) -> ViewportDelta {
    let pixel = viewport.pixel_size(res);
    let zoom = ViewportDelta::inset(zoom_inset(viewport, res, zoom_speed));

    let offset = (target.0 - viewport.center().0) / viewport.extent();
    let direction = DVec2::new(steer(offset.x), steer(offset.y));
    let pan = ViewportDelta::translation(direction * pixel * pan_speed);

    let delta = zoom + pan;
    delta + ViewportDelta::translation(unit_correction(&viewport.apply(delta)))
}

/// The viewport after one frame of pan and zoom.
pub fn advance_frame(
    viewport: &Viewport,
    target: TileCoord,
    res: Resolution,
    pan_speed: f64,
    zoom_speed: f64,
) -> Viewport {
    viewport.apply(frame_delta(viewport, target, res, pan_speed, zoom_speed))
}
