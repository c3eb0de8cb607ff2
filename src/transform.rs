//! Mapping between cartesian field space and graphical (pixel) space.
//!
//! The viewport is described by a cartesian `origin` (mapped to the window
//! centre) and a `range`: the number of cartesian units spanning the shorter
//! window dimension. Graphical Y grows downward, cartesian Y upward.

use glam::Vec2;

use crate::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};

fn window_centre() -> Vec2 {
    Vec2::new(WINDOW_WIDTH * 0.5, WINDOW_HEIGHT * 0.5)
}

/// Pixels per cartesian unit for the given range.
pub fn pixels_per_unit(range: i32) -> f32 {
    WINDOW_WIDTH.min(WINDOW_HEIGHT) / range as f32
}

/// Convert a pixel position to the cartesian point under it.
pub fn graphical_to_cartesian(point: Vec2, origin: Vec2, range: i32) -> Vec2 {
    let offset = (point - window_centre()) / pixels_per_unit(range);
    Vec2::new(origin.x + offset.x, origin.y - offset.y)
}

/// Convert a cartesian point to its pixel position.
pub fn cartesian_to_graphical(point: Vec2, origin: Vec2, range: i32) -> Vec2 {
    let scale = pixels_per_unit(range);
    let centre = window_centre();
    Vec2::new(
        centre.x + (point.x - origin.x) * scale,
        centre.y - (point.y - origin.y) * scale,
    )
}
