//! GPU side of the visualizer: the particle engine and the window canvas.

mod canvas;
mod engine;
mod mapping;

pub use canvas::{CanvasVertex, GpuCanvas, VertexBatch};
pub use engine::{
    load_kernel_source, reseed_flagged, seed_random_numbers, step_particle, EngineConfig,
    ParticleEngine, STEP_SCALE,
};
pub use mapping::{MappedBuffer, MappedBufferMut};
