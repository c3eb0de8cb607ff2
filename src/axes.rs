//! Axis lines and their end labels.
//!
//! The axes cross at the graphical position of the cartesian origin, pinned to
//! the window when the origin is off screen. Each axis carries a label at both
//! ends showing the cartesian value at that window edge. Labels are laid out
//! against a [`TextMetrics`] so layout stays independent of font rendering.

use glam::Vec2;

use crate::canvas::Canvas;
use crate::color::FOREGROUND_COLOUR;
use crate::constants::{AXES_LABEL_MARGIN, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::viewport::Viewport;

/// Size information for laid-out text.
pub trait TextMetrics {
    /// Width in pixels of `text`.
    fn text_width(&self, text: &str) -> f32;

    /// Height in pixels of one line.
    fn line_height(&self) -> f32;
}

/// Fixed-advance metrics: every glyph is `glyph_width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub glyph_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            glyph_width: 8.0,
            line_height: 16.0,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.glyph_width
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// One end-of-axis label.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisLabel {
    pub value: f32,
    pub position: Vec2,
}

impl AxisLabel {
    pub fn text(&self) -> String {
        format_label(self.value)
    }
}

/// Label text for a cartesian value.
pub fn format_label(value: f32) -> String {
    format!("{value:.1}")
}

/// Axis crossing point and the four end labels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    pub position: Vec2,
    pub x_positive: AxisLabel,
    pub x_negative: AxisLabel,
    pub y_positive: AxisLabel,
    pub y_negative: AxisLabel,
}

impl Axes {
    /// Lay out axes and labels for a viewport.
    pub fn layout(viewport: &Viewport, metrics: &impl TextMetrics) -> Self {
        let crossing = viewport.cartesian_to_graphical(Vec2::ZERO);
        let position = Vec2::new(
            crossing.x.clamp(0.0, WINDOW_WIDTH),
            crossing.y.clamp(0.0, WINDOW_HEIGHT),
        );

        let origin = viewport.cartesian_origin();
        let half_range = viewport.range() as f32 * 0.5;

        let mut axes = Self {
            position,
            x_positive: AxisLabel { value: origin.x + half_range, ..Default::default() },
            x_negative: AxisLabel { value: origin.x - half_range, ..Default::default() },
            y_positive: AxisLabel { value: origin.y + half_range, ..Default::default() },
            y_negative: AxisLabel { value: origin.y - half_range, ..Default::default() },
        };

        let line_height = metrics.line_height();
        let positive_x_width = metrics.text_width(&axes.x_positive.text());
        let negative_x_width = metrics.text_width(&axes.x_negative.text());
        let positive_y_width = metrics.text_width(&axes.y_positive.text());
        let negative_y_width = metrics.text_width(&axes.y_negative.text());

        // X labels sit below the horizontal axis unless that runs off screen.
        let x_label_y = if position.y > WINDOW_HEIGHT - line_height - AXES_LABEL_MARGIN {
            position.y - line_height - AXES_LABEL_MARGIN
        } else {
            position.y + AXES_LABEL_MARGIN
        };

        axes.x_positive.position =
            Vec2::new(WINDOW_WIDTH - positive_x_width - AXES_LABEL_MARGIN, x_label_y);
        axes.x_negative.position = Vec2::new(AXES_LABEL_MARGIN, x_label_y);

        // Y labels sit right of the vertical axis unless that runs off screen.
        let widest_y_label = positive_y_width.max(negative_y_width);
        let y_label_x = if position.x > WINDOW_WIDTH - widest_y_label {
            position.x - widest_y_label + AXES_LABEL_MARGIN
        } else {
            position.x + AXES_LABEL_MARGIN
        };

        axes.y_positive.position = Vec2::new(y_label_x, AXES_LABEL_MARGIN);
        axes.y_negative.position =
            Vec2::new(y_label_x, WINDOW_HEIGHT - AXES_LABEL_MARGIN - line_height);

        // Push apart the labels that would collide in the top-left and
        // bottom-right corners.
        if position.x < negative_y_width + 2.0 * AXES_LABEL_MARGIN
            && position.y < line_height + 2.0 * AXES_LABEL_MARGIN
        {
            axes.x_negative.position.y = line_height + 2.0 * AXES_LABEL_MARGIN;
            axes.y_positive.position.x = negative_x_width + 2.0 * AXES_LABEL_MARGIN;
        } else if position.x > WINDOW_WIDTH - positive_x_width - 2.0 * AXES_LABEL_MARGIN
            && position.y > WINDOW_HEIGHT - line_height - 2.0 * AXES_LABEL_MARGIN
        {
            axes.x_positive.position.x = WINDOW_WIDTH - AXES_LABEL_MARGIN - positive_y_width;
            axes.y_negative.position.y = WINDOW_HEIGHT - line_height - 2.0 * AXES_LABEL_MARGIN;
        }

        axes
    }

    /// Labels in drawing order: +x, -x, +y, -y.
    pub fn labels(&self) -> [&AxisLabel; 4] {
        [&self.x_positive, &self.x_negative, &self.y_positive, &self.y_negative]
    }

    /// Draw both axis lines and the four end labels in the foreground colour.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.set_draw_color(FOREGROUND_COLOUR);
        canvas.draw_line(
            Vec2::new(0.0, self.position.y),
            Vec2::new(WINDOW_WIDTH, self.position.y),
        );
        canvas.draw_line(
            Vec2::new(self.position.x, 0.0),
            Vec2::new(self.position.x, WINDOW_HEIGHT),
        );

        for label in self.labels() {
            canvas.draw_text(&label.text(), label.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::RecordingCanvas;
    use crate::render::tests::DrawCall;

    #[test]
    fn test_centred_origin_puts_axes_mid_window() {
        let axes = Axes::layout(&Viewport::new(), &MonospaceMetrics::default());
        assert_eq!(axes.position, Vec2::new(WINDOW_WIDTH * 0.5, WINDOW_HEIGHT * 0.5));
    }

    #[test]
    fn test_label_values_span_range() {
        let mut viewport = Viewport::new();
        viewport.set_cartesian_origin(Vec2::new(2.0, -1.0));
        viewport.set_range(10);

        let axes = Axes::layout(&viewport, &MonospaceMetrics::default());
        assert_eq!(axes.x_positive.value, 7.0);
        assert_eq!(axes.x_negative.value, -3.0);
        assert_eq!(axes.y_positive.value, 4.0);
        assert_eq!(axes.y_negative.value, -6.0);
        assert_eq!(axes.x_negative.text(), "-3.0");
    }

    #[test]
    fn test_off_screen_origin_pins_axes_to_edges() {
        let mut viewport = Viewport::new();
        viewport.set_cartesian_origin(Vec2::new(100.0, 100.0));

        let axes = Axes::layout(&viewport, &MonospaceMetrics::default());
        // Origin is below-left of the window.
        assert_eq!(axes.position, Vec2::new(0.0, WINDOW_HEIGHT));
    }

    #[test]
    fn test_x_labels_flip_above_axis_at_bottom_edge() {
        let metrics = MonospaceMetrics::default();
        let mut viewport = Viewport::new();
        viewport.set_cartesian_origin(Vec2::new(-100.0, 100.0));

        let axes = Axes::layout(&viewport, &metrics);
        assert_eq!(axes.position.y, WINDOW_HEIGHT);
        assert_eq!(
            axes.x_negative.position.y,
            WINDOW_HEIGHT - metrics.line_height - AXES_LABEL_MARGIN
        );
    }

    #[test]
    fn test_top_left_corner_collision_is_resolved() {
        let metrics = MonospaceMetrics::default();
        let mut viewport = Viewport::new();
        // Origin above-left of the window pins the axes to (0, 0).
        viewport.set_cartesian_origin(Vec2::new(100.0, -100.0));

        let axes = Axes::layout(&viewport, &metrics);
        assert_eq!(axes.position, Vec2::ZERO);
        assert_eq!(axes.x_negative.position.y, metrics.line_height + 2.0 * AXES_LABEL_MARGIN);
        assert_eq!(
            axes.y_positive.position.x,
            metrics.text_width(&axes.x_negative.text()) + 2.0 * AXES_LABEL_MARGIN
        );
    }

    #[test]
    fn test_draw_emits_two_foreground_lines_and_labels() {
        let axes = Axes::layout(&Viewport::new(), &MonospaceMetrics::default());
        let mut canvas = RecordingCanvas::default();
        axes.draw(&mut canvas);

        assert_eq!(canvas.calls[0], DrawCall::Color(FOREGROUND_COLOUR));
        let lines = canvas.calls.iter().filter(|c| matches!(c, DrawCall::Line(..))).count();
        assert_eq!(lines, 2);

        let texts: Vec<_> = canvas
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text(text, position) => Some((text.clone(), *position)),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = axes
            .labels()
            .into_iter()
            .map(|label| (label.text(), label.position))
            .collect();
        assert_eq!(texts, expected);
        assert!(texts.iter().any(|(text, _)| text == "5.0"));
        assert!(texts.iter().any(|(text, _)| text == "-5.0"));
    }
}
