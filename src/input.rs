//! Pointer input for the plot.
//!
//! Raw winit window events are turned into [`PointerEvent`]s in logical
//! pixels, and [`Mouse`] keeps the pointer state the plot needs each frame:
//! where the cursor is in both coordinate spaces and whether a pan is in
//! progress.

use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};

/// Pixels of touchpad scrolling that make up one zoom step.
const PIXELS_PER_SCROLL_STEP: f32 = 50.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Middle,
        }
    }
}

/// A pointer event the plot reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Cursor moved to a position in logical pixels.
    Moved(Vec2),
    Pressed(MouseButton),
    Released(MouseButton),
    /// Whole wheel steps; positive zooms in.
    Scrolled(i32),
}

/// Converts window events into [`PointerEvent`]s.
#[derive(Debug, Clone)]
pub struct Input {
    scale_factor: f64,
    // Wheel and touchpad deltas below one step carry over to the next event.
    pending_scroll: f32,
}

impl Input {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            pending_scroll: 0.0,
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    /// Translate a window event, or `None` if the plot ignores it.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(PointerEvent::Moved(
                logical_cursor(*position, self.scale_factor),
            )),
            WindowEvent::MouseInput { state, button, .. } => {
                let btn = MouseButton::from(*button);
                Some(match state {
                    ElementState::Pressed => PointerEvent::Pressed(btn),
                    ElementState::Released => PointerEvent::Released(btn),
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = self.scroll_steps(*delta);
                (steps != 0).then_some(PointerEvent::Scrolled(steps))
            }
            _ => None,
        }
    }

    /// Whole zoom steps for a wheel delta. One line is one step; pixel deltas
    /// are scaled by [`PIXELS_PER_SCROLL_STEP`]. Fractions accumulate.
    pub fn scroll_steps(&mut self, delta: MouseScrollDelta) -> i32 {
        self.pending_scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_SCROLL_STEP,
        };
        let steps = self.pending_scroll.trunc();
        self.pending_scroll -= steps;
        steps as i32
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Physical cursor position to logical pixels.
pub fn logical_cursor(position: PhysicalPosition<f64>, scale_factor: f64) -> Vec2 {
    let logical = position.to_logical::<f64>(scale_factor);
    Vec2::new(logical.x as f32, logical.y as f32)
}

/// Pointer state in both coordinate spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mouse {
    /// Cursor in graphical space.
    pub graphical_position: Vec2,
    /// Cartesian point under the cursor, refreshed every frame.
    pub cartesian_position: Vec2,
    /// Cartesian point grabbed when the current pan started.
    pub cartesian_drag_origin: Vec2,
    pub left_pressed: bool,
}

impl Mouse {
    pub fn new() -> Self {
        Self::default()
    }
}
