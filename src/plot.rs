//! The vector field plot: viewport, pointer state, sampled arrows and axes.

use glam::Vec2;

use crate::axes::{Axes, MonospaceMetrics};
use crate::canvas::Canvas;
use crate::color::Palette;
use crate::field::VectorField;
use crate::input::{Mouse, MouseButton, PointerEvent};
use crate::render::VectorFieldRenderer;
use crate::sampler::VectorFieldSampler;
use crate::viewport::Viewport;

/// Interactive plot of one [`VectorField`].
///
/// Pointer handlers only record state and raise the recompute flag; the grid
/// and axes are rebuilt on the next [`update`](Self::update).
#[derive(Debug)]
pub struct Plot {
    field: VectorField,
    viewport: Viewport,
    mouse: Mouse,
    sampler: VectorFieldSampler,
    axes: Axes,
    metrics: MonospaceMetrics,
    vector_renderer: VectorFieldRenderer,
}

impl Plot {
    pub fn new(field: VectorField, palette: Palette) -> Self {
        let viewport = Viewport::new();
        let metrics = MonospaceMetrics::default();
        Self {
            axes: Axes::layout(&viewport, &metrics),
            field,
            viewport,
            mouse: Mouse::new(),
            sampler: VectorFieldSampler::new(),
            metrics,
            vector_renderer: VectorFieldRenderer::new(palette),
        }
    }

    pub fn field(&self) -> &VectorField {
        &self.field
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    pub fn sampler(&self) -> &VectorFieldSampler {
        &self.sampler
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn update_on_next_pass(&mut self) {
        self.sampler.update_on_next_pass();
    }

    /// Per-frame update. Returns `true` if the arrows were recomputed.
    pub fn update(&mut self) -> bool {
        self.mouse.cartesian_position = self
            .viewport
            .graphical_to_cartesian(self.mouse.graphical_position);

        if !self.sampler.needs_update() {
            return false;
        }
        self.axes = Axes::layout(&self.viewport, &self.metrics);
        self.sampler.update(&self.field, &self.viewport)
    }

    /// Draw the arrows, then the axes over them.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        self.vector_renderer.draw(canvas, &self.sampler);
        self.axes.draw(canvas);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Moved(cursor) => self.cursor_moved(cursor),
            PointerEvent::Pressed(MouseButton::Left) => self.left_button(true),
            PointerEvent::Released(MouseButton::Left) => self.left_button(false),
            PointerEvent::Scrolled(steps) => self.scroll(steps),
            PointerEvent::Pressed(_) | PointerEvent::Released(_) => {}
        }
    }

    pub fn cursor_moved(&mut self, cursor: Vec2) {
        self.mouse.graphical_position = cursor;
        if self.mouse.left_pressed {
            self.viewport.drag_to(cursor, self.mouse.cartesian_drag_origin);
            self.update_on_next_pass();
        }
    }

    pub fn left_button(&mut self, pressed: bool) {
        if pressed && !self.mouse.left_pressed {
            self.mouse.cartesian_drag_origin =
                self.viewport.begin_drag(self.mouse.graphical_position);
        }
        if !pressed && self.mouse.left_pressed {
            tracing::debug!(origin = ?self.viewport.cartesian_origin(), "pan finished");
        }
        self.mouse.left_pressed = pressed;
    }

    pub fn scroll(&mut self, steps: i32) {
        if self.viewport.zoom(steps) {
            tracing::debug!(range = self.viewport.range(), "zoom");
            self.update_on_next_pass();
        }
    }
}
