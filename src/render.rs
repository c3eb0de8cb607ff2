//! Renderer adapters: translate sampled vectors and particle positions into
//! [`Canvas`] calls.

use glam::Vec2;

use crate::canvas::{Canvas, Rect, Vertex};
use crate::color::{Palette, PARTICLE_COLOUR};
use crate::constants::PARTICLE_SIZE;
use crate::sampler::{VectorFieldSampler, VectorSample};

/// Arrow head as two triangles: (head, left, right) and (left, right, tip).
const ARROW_HEAD_INDICES: [u32; 6] = [0, 1, 2, 1, 2, 3];

/// Draws every sampled vector as a line body plus a filled head, coloured by
/// normalized magnitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorFieldRenderer {
    pub palette: Palette,
}

impl VectorFieldRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn draw(&self, canvas: &mut impl Canvas, sampler: &VectorFieldSampler) {
        for sample in sampler.samples() {
            self.draw_vector(canvas, sampler, sample);
        }
    }

    fn draw_vector(&self, canvas: &mut impl Canvas, sampler: &VectorFieldSampler, sample: &VectorSample) {
        let color = self.palette.sample(sampler.normalized_magnitude(sample.magnitude));
        canvas.set_draw_color(color);
        canvas.draw_line(sample.tail, sample.head);

        let vertices = [sample.head, sample.head_left, sample.head_right, sample.tip]
            .map(|position| Vertex { position, color });
        canvas.draw_geometry(&vertices, &ARROW_HEAD_INDICES);
    }
}

/// Draws particles as small grey squares.
///
/// Owns a rect buffer sized once for the particle count and refilled on every
/// draw.
#[derive(Debug, Clone)]
pub struct ParticleRenderer {
    rects: Vec<Rect>,
}

impl ParticleRenderer {
    pub fn new(particle_count: usize) -> Self {
        Self {
            rects: Vec::with_capacity(particle_count),
        }
    }

    /// Number of rects the scratch buffer holds without reallocating.
    pub fn capacity(&self) -> usize {
        self.rects.capacity()
    }

    pub fn draw(&mut self, canvas: &mut impl Canvas, positions: &[Vec2]) {
        self.rects.clear();
        self.rects
            .extend(positions.iter().map(|&p| Rect::centred(p, PARTICLE_SIZE)));

        canvas.set_draw_color(PARTICLE_COLOUR);
        canvas.fill_rects(&self.rects);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::Color;
    use crate::field::VectorField;
    use crate::viewport::Viewport;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum DrawCall {
        Color(Color),
        Line(Vec2, Vec2),
        Rects(Vec<Rect>),
        Geometry(Vec<Vertex>, Vec<u32>),
        Text(String, Vec2),
    }

    /// Canvas that records every call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingCanvas {
        pub calls: Vec<DrawCall>,
    }

    impl Canvas for RecordingCanvas {
        fn set_draw_color(&mut self, color: Color) {
            self.calls.push(DrawCall::Color(color));
        }

        fn draw_line(&mut self, from: Vec2, to: Vec2) {
            self.calls.push(DrawCall::Line(from, to));
        }

        fn fill_rects(&mut self, rects: &[Rect]) {
            self.calls.push(DrawCall::Rects(rects.to_vec()));
        }

        fn draw_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) {
            self.calls.push(DrawCall::Geometry(vertices.to_vec(), indices.to_vec()));
        }

        fn draw_text(&mut self, text: &str, position: Vec2) {
            self.calls.push(DrawCall::Text(text.to_string(), position));
        }
    }

    #[test]
    fn test_particles_drawn_as_centred_squares() {
        let mut renderer = ParticleRenderer::new(2);
        let mut canvas = RecordingCanvas::default();
        renderer.draw(&mut canvas, &[Vec2::new(10.0, 20.0), Vec2::new(0.0, 0.0)]);

        assert_eq!(canvas.calls[0], DrawCall::Color(PARTICLE_COLOUR));
        assert_eq!(
            canvas.calls[1],
            DrawCall::Rects(vec![
                Rect::new(8.5, 18.5, 3.0, 3.0),
                Rect::new(-1.5, -1.5, 3.0, 3.0),
            ])
        );
    }

    #[test]
    fn test_particle_scratch_buffer_is_reused() {
        let positions = vec![Vec2::ONE; 64];
        let mut renderer = ParticleRenderer::new(positions.len());
        let capacity = renderer.capacity();
        assert!(capacity >= 64);

        let mut canvas = RecordingCanvas::default();
        for _ in 0..3 {
            renderer.draw(&mut canvas, &positions);
        }
        assert_eq!(renderer.capacity(), capacity);
    }

    #[test]
    fn test_vector_renderer_emits_line_and_head_per_sample() {
        let mut sampler = VectorFieldSampler::new();
        sampler.update(&VectorField::rotation(), &Viewport::new());

        let mut canvas = RecordingCanvas::default();
        VectorFieldRenderer::default().draw(&mut canvas, &sampler);

        let samples = sampler.samples().len();
        assert_eq!(canvas.calls.len(), samples * 3);

        let first = sampler.sample(0, 0);
        assert_eq!(canvas.calls[1], DrawCall::Line(first.tail, first.head));
        match &canvas.calls[2] {
            DrawCall::Geometry(vertices, indices) => {
                assert_eq!(indices, &ARROW_HEAD_INDICES.to_vec());
                assert_eq!(vertices[0].position, first.head);
                assert_eq!(vertices[3].position, first.tip);
            }
            other => panic!("expected geometry, got {other:?}"),
        }
    }

    #[test]
    fn test_strongest_vector_gets_top_of_palette() {
        let mut sampler = VectorFieldSampler::new();
        sampler.update(&VectorField::source(), &Viewport::new());
        let renderer = VectorFieldRenderer::new(Palette::Heat);

        let strongest = sampler
            .samples()
            .iter()
            .position(|s| s.magnitude == sampler.maximum_magnitude())
            .unwrap();

        let mut canvas = RecordingCanvas::default();
        renderer.draw(&mut canvas, &sampler);
        assert_eq!(canvas.calls[strongest * 3], DrawCall::Color(Palette::Heat.sample(1.0)));
    }
}
