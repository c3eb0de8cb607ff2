//! Build-time configuration.
//!
//! Everything here is fixed when the crate is compiled. Runtime wiring that
//! may differ per run (kernel path, palette, window title) lives on
//! [`EngineConfig`](crate::EngineConfig) and [`Visualizer`](crate::Visualizer).

/// Number of simulated particles (N).
pub const PARTICLE_COUNT: u32 = 10_000;

/// Window width in pixels.
pub const WINDOW_WIDTH: f32 = 800.0;

/// Window height in pixels.
pub const WINDOW_HEIGHT: f32 = 800.0;

/// Side length of the (square) window handed to the kernel.
pub const WINDOW_SIZE: u32 = 800;

/// Rows in the vector sample grid.
pub const SAMPLE_POINT_ROW_COUNT: usize = 20;

/// Columns in the vector sample grid.
pub const SAMPLE_POINT_COLUMN_COUNT: usize = 20;

/// Arrow body length in pixels.
pub const VECTOR_ARROW_BODY_LENGTH: f32 = 20.0;

/// Distance from the arrow head to its tip, in pixels.
pub const VECTOR_ARROW_HEAD_LENGTH: f32 = 7.0;

/// Distance from the arrow head to each wing, in pixels.
pub const VECTOR_ARROW_HEAD_HALF_WIDTH: f32 = 5.0;

/// Smallest viewport range (cartesian units across the window).
pub const VIEWPORT_MINIMUM_RANGE: i32 = 2;

/// Largest viewport range.
pub const VIEWPORT_MAXIMUM_RANGE: i32 = 200;

/// Range a fresh viewport starts with.
pub const VIEWPORT_DEFAULT_RANGE: i32 = 10;

/// Gap between axis labels and the axes / window edges, in pixels.
pub const AXES_LABEL_MARGIN: f32 = 5.0;

/// Side length of the square drawn for each particle, in pixels.
pub const PARTICLE_SIZE: f32 = 3.0;

/// Kernel source location, relative to the working directory.
pub const KERNEL_FILE_PATH: &str = "kernels/update_particle_data.wgsl";
