//! Grid sampling of the vector field into arrow geometry.
//!
//! The window is divided into a fixed grid of
//! [`SAMPLE_POINT_ROW_COUNT`] × [`SAMPLE_POINT_COLUMN_COUNT`] cells. For each
//! cell the field is evaluated at the cell centre and an arrow (tail, head,
//! two head wings and a tip) is derived in graphical space. The global
//! minimum and maximum magnitude are kept for colour normalization.
//!
//! Geometry is only recomputed when [`needs_update`](VectorFieldSampler::needs_update)
//! is raised, typically by a viewport change. Cursor movement alone never
//! touches it.

use std::f32::consts::FRAC_PI_4;

use glam::Vec2;

use crate::constants::{
    SAMPLE_POINT_COLUMN_COUNT, SAMPLE_POINT_ROW_COUNT, VECTOR_ARROW_BODY_LENGTH,
    VECTOR_ARROW_HEAD_HALF_WIDTH, VECTOR_ARROW_HEAD_LENGTH, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::field::VectorField;
use crate::viewport::Viewport;

/// Arrow geometry for one grid cell. All points are graphical.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VectorSample {
    pub tail: Vec2,
    pub head: Vec2,
    pub head_left: Vec2,
    pub head_right: Vec2,
    pub tip: Vec2,
    pub magnitude: f32,
}

/// Graphical centre of grid cell `(row, column)`.
pub fn sample_point(row: usize, column: usize) -> Vec2 {
    Vec2::new(
        (2.0 * column as f32 + 1.0) * WINDOW_WIDTH / (2 * SAMPLE_POINT_COLUMN_COUNT) as f32,
        (2.0 * row as f32 + 1.0) * WINDOW_HEIGHT / (2 * SAMPLE_POINT_ROW_COUNT) as f32,
    )
}

/// Project `length` pixels from a cartesian point along a cartesian angle.
///
/// NOTE: intentionally odd. The start point is converted to graphical space
/// and the offset `(cos(-angle), sin(-angle)) * length` is added there, so
/// this is a graphical-space offset rather than a true cartesian projection.
/// Arrow shapes depend on this exact behaviour.
pub fn fixed_length_projection(point: Vec2, length: f32, angle: f32, viewport: &Viewport) -> Vec2 {
    viewport.cartesian_to_graphical(point) + length * Vec2::new((-angle).cos(), (-angle).sin())
}

/// Samples a [`VectorField`] over the fixed grid.
#[derive(Debug, Clone)]
pub struct VectorFieldSampler {
    samples: Vec<VectorSample>,
    minimum_magnitude: f32,
    maximum_magnitude: f32,
    needs_update: bool,
}

impl VectorFieldSampler {
    /// A sampler with default geometry that recomputes on the first update.
    pub fn new() -> Self {
        Self {
            samples: vec![VectorSample::default(); SAMPLE_POINT_ROW_COUNT * SAMPLE_POINT_COLUMN_COUNT],
            minimum_magnitude: 0.0,
            maximum_magnitude: 0.0,
            needs_update: true,
        }
    }

    /// Request a full recompute on the next [`update`](Self::update).
    pub fn update_on_next_pass(&mut self) {
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Recompute the grid if an update was requested.
    ///
    /// Returns `true` if geometry was recomputed.
    pub fn update(&mut self, field: &VectorField, viewport: &Viewport) -> bool {
        if !self.needs_update {
            return false;
        }
        self.recompute(field, viewport);
        self.needs_update = false;
        true
    }

    fn recompute(&mut self, field: &VectorField, viewport: &Viewport) {
        self.minimum_magnitude = 0.0;
        self.maximum_magnitude = 0.0;

        for row in 0..SAMPLE_POINT_ROW_COUNT {
            for column in 0..SAMPLE_POINT_COLUMN_COUNT {
                let properties = &mut self.samples[row * SAMPLE_POINT_COLUMN_COUNT + column];

                properties.tail = sample_point(row, column);
                let cartesian_tail = viewport.graphical_to_cartesian(properties.tail);

                let direction = field.evaluate(cartesian_tail);
                let magnitude = direction.length();
                properties.magnitude = magnitude;

                if magnitude > self.maximum_magnitude {
                    self.maximum_magnitude = magnitude;
                } else if magnitude < self.minimum_magnitude {
                    self.minimum_magnitude = magnitude;
                }

                // Zero-length vectors keep whatever head geometry they had.
                if magnitude > 0.0 {
                    let angle = direction.y.atan2(direction.x);

                    properties.head = fixed_length_projection(
                        cartesian_tail,
                        VECTOR_ARROW_BODY_LENGTH,
                        angle,
                        viewport,
                    );

                    let cartesian_head = viewport.graphical_to_cartesian(properties.head);

                    properties.head_left = fixed_length_projection(
                        cartesian_head,
                        VECTOR_ARROW_HEAD_HALF_WIDTH,
                        angle - FRAC_PI_4,
                        viewport,
                    );
                    properties.head_right = fixed_length_projection(
                        cartesian_head,
                        VECTOR_ARROW_HEAD_HALF_WIDTH,
                        angle + FRAC_PI_4,
                        viewport,
                    );
                    properties.tip = fixed_length_projection(
                        cartesian_head,
                        VECTOR_ARROW_HEAD_LENGTH,
                        angle,
                        viewport,
                    );
                }
            }
        }
    }

    /// Sample at `(row, column)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the grid.
    pub fn sample(&self, row: usize, column: usize) -> &VectorSample {
        assert!(row < SAMPLE_POINT_ROW_COUNT && column < SAMPLE_POINT_COLUMN_COUNT);
        &self.samples[row * SAMPLE_POINT_COLUMN_COUNT + column]
    }

    /// All samples in row-major order.
    pub fn samples(&self) -> &[VectorSample] {
        &self.samples
    }

    pub fn minimum_magnitude(&self) -> f32 {
        self.minimum_magnitude
    }

    pub fn maximum_magnitude(&self) -> f32 {
        self.maximum_magnitude
    }

    /// Position of `magnitude` between the grid minimum and maximum, for
    /// colour lookup. Yields `0.0` when every sample has the same magnitude.
    pub fn normalized_magnitude(&self, magnitude: f32) -> f32 {
        let span = self.maximum_magnitude - self.minimum_magnitude;
        if span == 0.0 {
            return 0.0;
        }
        (magnitude - self.minimum_magnitude) / span
    }
}

impl Default for VectorFieldSampler {
    fn default() -> Self {
        Self::new()
    }
}
