//! # fieldflow
//!
//! Interactive plots of 2D vector fields with a GPU particle flow drawn over
//! them.
//!
//! A [`VectorField`] is a pair of scalar functions. The plot samples it on a
//! fixed grid of arrows, coloured by magnitude, while a compute kernel moves
//! thousands of particles along the same field. Particles that leave the
//! visible viewport are relocated using per-particle random values which the
//! host refreshes after every step.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fieldflow::prelude::*;
//!
//! fn main() -> Result<(), VisualizerError> {
//!     Visualizer::new(VectorField::rotation())
//!         .with_title("Rotation")
//!         .run()
//! }
//! ```
//!
//! Custom fields carry both a host closure (used by the arrow sampler) and the
//! equivalent WGSL expression (used by the kernel):
//!
//! ```ignore
//! let field = VectorField::new(
//!     BivariateFunction::new(|p| p.y.sin(), "sin(p.y)"),
//!     BivariateFunction::new(|p| p.x.cos(), "cos(p.x)"),
//! );
//! ```
//!
//! ## Coordinate spaces
//!
//! | Space | Origin | Y axis | Units |
//! |-------|--------|--------|-------|
//! | Graphical | window top-left | down | pixels |
//! | Cartesian | viewport centre | up | field units |
//!
//! [`Viewport`] maps between the two; the window always shows `range` units
//! across its shorter side.
//!
//! ## Logging
//!
//! The library logs through `tracing`. Install a subscriber (the demos use
//! `tracing_subscriber::fmt` with `RUST_LOG`) to see adapter selection and
//! kernel diagnostics.

pub mod app;
pub mod axes;
pub mod canvas;
pub mod color;
pub mod constants;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod plot;
pub mod render;
pub mod sampler;
pub mod transform;
pub mod viewport;

pub use app::Visualizer;
pub use canvas::{Canvas, Rect, Vertex};
pub use color::{Color, Palette};
pub use error::{EngineError, GpuError, KernelError, VisualizerError};
pub use field::{BivariateFunction, VectorField};
pub use glam::Vec2;
pub use gpu::{EngineConfig, GpuCanvas, ParticleEngine};
pub use plot::Plot;
pub use sampler::{VectorFieldSampler, VectorSample};
pub use viewport::Viewport;

/// Common imports.
///
/// ```ignore
/// use fieldflow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::Visualizer;
    pub use crate::axes::{Axes, MonospaceMetrics, TextMetrics};
    pub use crate::canvas::{Canvas, Rect, Vertex};
    pub use crate::color::{Color, Palette};
    pub use crate::error::{EngineError, GpuError, KernelError, VisualizerError};
    pub use crate::field::{BivariateFunction, VectorField};
    pub use crate::gpu::{EngineConfig, ParticleEngine};
    pub use crate::plot::Plot;
    pub use crate::viewport::Viewport;
    pub use crate::Vec2;
}
