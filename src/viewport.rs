//! The cartesian window currently shown on screen.

use glam::Vec2;

use crate::constants::{VIEWPORT_DEFAULT_RANGE, VIEWPORT_MAXIMUM_RANGE, VIEWPORT_MINIMUM_RANGE};
use crate::transform;

/// Viewport state: a cartesian centre, a range and the origin captured at the
/// start of a pan.
///
/// `range` is always within
/// [`VIEWPORT_MINIMUM_RANGE`]..=[`VIEWPORT_MAXIMUM_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    cartesian_origin: Vec2,
    range: i32,
    cartesian_drag_origin: Vec2,
}

impl Viewport {
    /// Viewport centred on the cartesian origin with the default range.
    pub fn new() -> Self {
        Self {
            cartesian_origin: Vec2::ZERO,
            range: VIEWPORT_DEFAULT_RANGE,
            cartesian_drag_origin: Vec2::ZERO,
        }
    }

    pub fn cartesian_origin(&self) -> Vec2 {
        self.cartesian_origin
    }

    pub fn set_cartesian_origin(&mut self, origin: Vec2) {
        self.cartesian_origin = origin;
    }

    pub fn cartesian_drag_origin(&self) -> Vec2 {
        self.cartesian_drag_origin
    }

    pub fn set_cartesian_drag_origin(&mut self, origin: Vec2) {
        self.cartesian_drag_origin = origin;
    }

    pub fn range(&self) -> i32 {
        self.range
    }

    /// Set the range, clamped to the allowed bounds.
    pub fn set_range(&mut self, range: i32) {
        self.range = range.clamp(VIEWPORT_MINIMUM_RANGE, VIEWPORT_MAXIMUM_RANGE);
    }

    /// Cartesian point under a pixel.
    pub fn graphical_to_cartesian(&self, point: Vec2) -> Vec2 {
        transform::graphical_to_cartesian(point, self.cartesian_origin, self.range)
    }

    /// Pixel position of a cartesian point.
    pub fn cartesian_to_graphical(&self, point: Vec2) -> Vec2 {
        transform::cartesian_to_graphical(point, self.cartesian_origin, self.range)
    }

    /// Record where a pan starts. `cursor` is the cursor in pixels; returns
    /// the cartesian point under it, which the caller keeps as the mouse drag
    /// origin.
    pub fn begin_drag(&mut self, cursor: Vec2) -> Vec2 {
        self.cartesian_drag_origin = self.cartesian_origin;
        self.graphical_to_cartesian(cursor)
    }

    /// Move the viewport so the point grabbed at [`begin_drag`](Self::begin_drag)
    /// stays under the cursor.
    ///
    /// Positions are resolved against the origin captured at drag start, so
    /// the result depends only on the total cursor travel.
    pub fn drag_to(&mut self, cursor: Vec2, mouse_drag_origin: Vec2) {
        let under_cursor =
            transform::graphical_to_cartesian(cursor, self.cartesian_drag_origin, self.range);
        self.cartesian_origin = self.cartesian_drag_origin + (mouse_drag_origin - under_cursor);
    }

    /// Zoom by whole range steps. Positive `steps` zoom in.
    ///
    /// Returns `true` if the range changed.
    pub fn zoom(&mut self, steps: i32) -> bool {
        let before = self.range;
        self.set_range(self.range.saturating_sub(steps));
        self.range != before
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
