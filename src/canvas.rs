//! 2D drawing surface used by the renderer adapters.
//!
//! Coordinates are graphical: pixels, origin top-left, Y down. Implementors
//! must preserve call order so later draws land on top of earlier ones.

use glam::Vec2;

use crate::color::Color;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of side `size` centred on `centre`.
    pub fn centred(centre: Vec2, size: f32) -> Self {
        let half = size * 0.5;
        Self::new(centre.x - half, centre.y - half, size, size)
    }
}

/// A coloured vertex for [`Canvas::draw_geometry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec2,
    pub color: Color,
}

/// Immediate-mode drawing surface.
pub trait Canvas {
    /// Colour used by subsequent [`draw_line`](Self::draw_line) and
    /// [`fill_rects`](Self::fill_rects) calls.
    fn set_draw_color(&mut self, color: Color);

    /// One-pixel line between two points.
    fn draw_line(&mut self, from: Vec2, to: Vec2);

    /// Filled rectangles in the current draw colour.
    fn fill_rects(&mut self, rects: &[Rect]);

    /// Indexed triangle list. Every three indices form one triangle.
    fn draw_geometry(&mut self, vertices: &[Vertex], indices: &[u32]);

    /// One line of text with its top-left corner at `position`, in the
    /// current draw colour.
    ///
    /// Surfaces without a glyph rasterizer ignore text.
    fn draw_text(&mut self, text: &str, position: Vec2) {
        let _ = (text, position);
    }
}
