//! GPU particle engine.
//!
//! Owns the compute device, the particle kernel and four parallel storage
//! buffers:
//!
//! | binding | buffer                 | element     | written by        |
//! |---------|------------------------|-------------|-------------------|
//! | 0       | `random_numbers`       | `f32`       | host              |
//! | 1       | `random_number_flags`  | `u32`       | kernel sets, host clears |
//! | 2       | `cartesian_positions`  | `vec2<f32>` | kernel            |
//! | 3       | `graphical_positions`  | `vec2<f32>` | kernel            |
//!
//! Bindings 4 and 5 are the static particle parameters (written once) and the
//! viewport parameters (rewritten by every [`update`](ParticleEngine::update)).
//!
//! Each frame runs strictly in order: viewport write, dispatch, blocking
//! readback of the flags, host reseed pass, write-back. [`draw`](ParticleEngine::draw)
//! later maps the graphical positions for reading. Every map blocks until the
//! GPU work touching that buffer is done; there is no other synchronization
//! and no timeout on a stalled dispatch.

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::mapping::{MappedBuffer, MappedBufferMut};
use crate::canvas::Canvas;
use crate::constants::{KERNEL_FILE_PATH, PARTICLE_COUNT, WINDOW_SIZE};
use crate::error::{EngineError, GpuError, KernelError};
use crate::field::VectorField;
use crate::render::ParticleRenderer;

const WORKGROUP_SIZE: u32 = 256;
const KERNEL_ENTRY_POINT: &str = "main";

/// Fraction of the viewport range travelled per unit of field magnitude.
/// Must match `STEP_SCALE` in the kernel.
pub const STEP_SCALE: f32 = 0.002;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ParticleParams {
    particle_count: u32,
    window_size: u32,
    _padding: [u32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ViewportParams {
    origin: [f32; 2],
    range: i32,
    scatter: u32,
}

/// Startup configuration for a [`ParticleEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of particles (N). Buffers are sized for exactly this many.
    pub particle_count: u32,
    /// Kernel source file.
    pub kernel_path: PathBuf,
    /// Side length of the square window, in pixels.
    pub window_size: u32,
    /// Accept a software (CPU) adapter when no hardware GPU is present.
    pub allow_software_adapter: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            kernel_path: PathBuf::from(KERNEL_FILE_PATH),
            window_size: WINDOW_SIZE,
            allow_software_adapter: false,
        }
    }

    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_kernel_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.kernel_path = path.into();
        self
    }

    pub fn with_window_size(mut self, size: u32) -> Self {
        self.window_size = size;
        self
    }

    pub fn with_software_adapter(mut self, allow: bool) -> Self {
        self.allow_software_adapter = allow;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill every slot with a fresh value in `[0, 1)` and clear every flag.
pub fn seed_random_numbers(random_numbers: &mut [f32], flags: &mut [u32], rng: &mut impl Rng) {
    for value in random_numbers.iter_mut() {
        *value = rng.gen();
    }
    flags.fill(0);
}

/// Replace the random value of every flagged particle and clear its flag.
///
/// The replacement always differs from the consumed value. Returns the number
/// of particles reseeded.
pub fn reseed_flagged(random_numbers: &mut [f32], flags: &mut [u32], rng: &mut impl Rng) -> usize {
    let mut reseeded = 0;
    for (value, flag) in random_numbers.iter_mut().zip(flags.iter_mut()) {
        if *flag != 0 {
            *value = fresh_random_value(rng, *value);
            *flag = 0;
            reseeded += 1;
        }
    }
    reseeded
}

fn fresh_random_value(rng: &mut impl Rng, previous: f32) -> f32 {
    loop {
        let value: f32 = rng.gen();
        if value != previous {
            return value;
        }
    }
}

/// Host copy of one kernel invocation, for checking the flow without a device.
///
/// Advances `position` one Euler step along `field` and returns the new
/// position and whether the reseed flag was raised. `scatter` forces the
/// relocation, as the first dispatch does.
pub fn step_particle(
    field: &VectorField,
    position: Vec2,
    viewport_cartesian_origin: Vec2,
    viewport_range: i32,
    seed: f32,
    index: u32,
    scatter: bool,
) -> (Vec2, bool) {
    let range = viewport_range as f32;
    let next = position + field.evaluate(position) * range * STEP_SCALE;

    let half_range = Vec2::splat(range * 0.5);
    let offset = (next - viewport_cartesian_origin).abs();
    // Written so NaN lands outside, as in the kernel.
    let inside = offset.x <= half_range.x && offset.y <= half_range.y;

    if scatter || !inside {
        let v = seed * 1619.0 + index as f32 * 0.618_033_9;
        let relocated = Vec2::new(seed, v - v.floor()) - Vec2::splat(0.5);
        (viewport_cartesian_origin + relocated * range, true)
    } else {
        (next, false)
    }
}

/// Read the kernel file and append the field function.
pub fn load_kernel_source(path: &Path, field: &VectorField) -> Result<String, KernelError> {
    let kernel = std::fs::read_to_string(path).map_err(|source| KernelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("{kernel}\n{}", field.to_wgsl()))
}

/// GPU particle simulation flowing along a [`VectorField`].
///
/// Construction is the whole initialization: a value of this type is always
/// ready to [`update`](Self::update). Dropping it releases the device and all
/// buffers.
pub struct ParticleEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    compute_pipeline: wgpu::ComputePipeline,
    compute_bind_group: wgpu::BindGroup,
    random_numbers_buffer: wgpu::Buffer,
    random_number_flags_buffer: wgpu::Buffer,
    graphical_positions_buffer: wgpu::Buffer,
    viewport_buffer: wgpu::Buffer,
    flags_readback_buffer: wgpu::Buffer,
    positions_readback_buffer: wgpu::Buffer,
    // Host copy of the random numbers. The kernel only reads them.
    random_numbers: Vec<f32>,
    random_number_flags: Vec<u32>,
    rng: StdRng,
    num_particles: u32,
    // Cleared by the first dispatch, which relocates every particle.
    needs_scatter: bool,
    renderer: ParticleRenderer,
}

impl ParticleEngine {
    /// Blocking wrapper around [`new_async`](Self::new_async).
    pub fn new(field: &VectorField, config: &EngineConfig) -> Result<Self, EngineError> {
        pollster::block_on(Self::new_async(field, config))
    }

    pub async fn new_async(field: &VectorField, config: &EngineConfig) -> Result<Self, EngineError> {
        let (device, queue, adapter_info) = request_compute_device(config).await?;

        let kernel_source = load_kernel_source(&config.kernel_path, field)?;
        let num_particles = config.particle_count;
        let particle_bytes = num_particles as u64 * std::mem::size_of::<f32>() as u64;
        let position_bytes = num_particles as u64 * std::mem::size_of::<Vec2>() as u64;

        let mut rng = StdRng::from_entropy();
        let mut random_numbers = vec![0.0; num_particles as usize];
        let mut random_number_flags = vec![0; num_particles as usize];
        seed_random_numbers(&mut random_numbers, &mut random_number_flags, &mut rng);

        let random_numbers_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Random Numbers Buffer"),
            size: particle_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        let random_number_flags_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Random Number Flags Buffer"),
            size: particle_bytes,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });

        // Seed before anything can dispatch.
        MappedBufferMut::at_creation(&random_numbers_buffer)
            .as_mut_slice::<f32>()
            .copy_from_slice(&random_numbers);
        MappedBufferMut::at_creation(&random_number_flags_buffer)
            .as_mut_slice::<u32>()
            .copy_from_slice(&random_number_flags);

        // Positions start zeroed. The first dispatch scatters them.
        let cartesian_positions_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cartesian Positions Buffer"),
            size: position_bytes,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let graphical_positions_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Graphical Positions Buffer"),
            size: position_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let flags_readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Flags Readback Buffer"),
            size: particle_bytes,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let positions_readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Positions Readback Buffer"),
            size: position_bytes,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let particle_params = ParticleParams {
            particle_count: num_particles,
            window_size: config.window_size,
            _padding: [0; 2],
        };
        let params_buffer = wgpu::util::DeviceExt::create_buffer_init(
            &device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Particle Params Buffer"),
                contents: bytemuck::bytes_of(&particle_params),
                usage: wgpu::BufferUsages::UNIFORM,
            },
        );
        let viewport_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Viewport Params Buffer"),
            size: std::mem::size_of::<ViewportParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let compute_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Particle Bind Group Layout"),
                entries: &[
                    storage_entry(0, true),
                    storage_entry(1, false),
                    storage_entry(2, false),
                    storage_entry(3, false),
                    uniform_entry(4),
                    uniform_entry(5),
                ],
            });

        // Bound once; only the viewport buffer's contents change per frame.
        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &compute_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: random_numbers_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: random_number_flags_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: cartesian_positions_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: graphical_positions_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: viewport_buffer.as_entire_binding(),
                },
            ],
        });

        let compute_pipeline =
            build_kernel(&device, &compute_bind_group_layout, &kernel_source, &adapter_info).await?;

        tracing::debug!(particles = num_particles, "particle engine ready");

        Ok(Self {
            device,
            queue,
            adapter_info,
            compute_pipeline,
            compute_bind_group,
            random_numbers_buffer,
            random_number_flags_buffer,
            graphical_positions_buffer,
            viewport_buffer,
            flags_readback_buffer,
            positions_readback_buffer,
            random_numbers,
            random_number_flags,
            rng,
            num_particles,
            needs_scatter: true,
            renderer: ParticleRenderer::new(num_particles as usize),
        })
    }

    /// Number of particles the buffers were sized for.
    pub fn particle_count(&self) -> u32 {
        self.num_particles
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Host copy of the per-particle random values.
    pub fn random_numbers(&self) -> &[f32] {
        &self.random_numbers
    }

    /// Advance every particle one step for the given viewport, then refresh
    /// the random values the kernel consumed.
    ///
    /// `particle_count` is dispatched as given. It should equal
    /// [`particle_count`](Self::particle_count); anything else is logged.
    ///
    /// Returns the number of particles reseeded.
    pub fn update(
        &mut self,
        particle_count: u32,
        viewport_cartesian_origin: Vec2,
        viewport_range: i32,
    ) -> Result<usize, GpuError> {
        if particle_count != self.num_particles {
            tracing::warn!(
                requested = particle_count,
                allocated = self.num_particles,
                "dispatching a particle count that differs from the buffer size"
            );
        }

        let viewport = ViewportParams {
            origin: viewport_cartesian_origin.to_array(),
            range: viewport_range,
            scatter: u32::from(self.needs_scatter),
        };
        self.needs_scatter = false;
        self.queue
            .write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(&viewport));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Update Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Compute Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.compute_pipeline);
            compute_pass.set_bind_group(0, &self.compute_bind_group, &[]);

            let workgroups = particle_count.div_ceil(WORKGROUP_SIZE);
            compute_pass.dispatch_workgroups(workgroups, 1, 1);
        }

        encoder.copy_buffer_to_buffer(
            &self.random_number_flags_buffer,
            0,
            &self.flags_readback_buffer,
            0,
            self.flags_readback_buffer.size(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        {
            let flags = MappedBuffer::read(&self.device, &self.flags_readback_buffer)?;
            self.random_number_flags.copy_from_slice(flags.as_slice::<u32>());
        }

        // Runs every frame: the host is the only source of new randomness.
        let reseeded = reseed_flagged(
            &mut self.random_numbers,
            &mut self.random_number_flags,
            &mut self.rng,
        );

        self.queue.write_buffer(
            &self.random_numbers_buffer,
            0,
            bytemuck::cast_slice(&self.random_numbers),
        );
        self.queue.write_buffer(
            &self.random_number_flags_buffer,
            0,
            bytemuck::cast_slice(&self.random_number_flags),
        );

        tracing::trace!(reseeded, "particle update");
        Ok(reseeded)
    }

    /// Draw every particle at its latest graphical position.
    pub fn draw(&mut self, canvas: &mut impl Canvas) -> Result<(), GpuError> {
        self.copy_to_readback(&self.graphical_positions_buffer, &self.positions_readback_buffer);

        let positions = MappedBuffer::read(&self.device, &self.positions_readback_buffer)?;
        self.renderer.draw(canvas, positions.as_slice::<Vec2>());
        Ok(())
    }

    /// Current graphical positions, copied off the GPU.
    pub fn read_graphical_positions(&self) -> Result<Vec<Vec2>, GpuError> {
        self.copy_to_readback(&self.graphical_positions_buffer, &self.positions_readback_buffer);
        let positions = MappedBuffer::read(&self.device, &self.positions_readback_buffer)?;
        Ok(positions.as_slice::<Vec2>().to_vec())
    }

    /// Current reseed flags, copied off the GPU.
    pub fn read_random_number_flags(&self) -> Result<Vec<u32>, GpuError> {
        self.copy_to_readback(&self.random_number_flags_buffer, &self.flags_readback_buffer);
        let flags = MappedBuffer::read(&self.device, &self.flags_readback_buffer)?;
        Ok(flags.as_slice::<u32>().to_vec())
    }

    fn copy_to_readback(&self, source: &wgpu::Buffer, readback: &wgpu::Buffer) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(source, 0, readback, 0, readback.size());
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl Drop for ParticleEngine {
    fn drop(&mut self) {
        tracing::debug!("particle engine destroyed");
    }
}

async fn request_compute_device(
    config: &EngineConfig,
) -> Result<(wgpu::Device, wgpu::Queue, wgpu::AdapterInfo), GpuError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::NoAdapter)?;

    let adapter_info = adapter.get_info();
    if adapter_info.device_type == wgpu::DeviceType::Cpu && !config.allow_software_adapter {
        tracing::error!(adapter = %adapter_info.name, "only a software adapter is available");
        return Err(GpuError::NoAdapter);
    }

    tracing::info!(
        "GPU adapter selected: {} ({:?})",
        adapter_info.name,
        adapter_info.backend
    );

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Particle Engine Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        )
        .await?;

    Ok((device, queue, adapter_info))
}

/// Compile the kernel inside a validation scope so a broken kernel comes back
/// as an error with its diagnostic instead of a panic.
async fn build_kernel(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    source: &str,
    adapter_info: &wgpu::AdapterInfo,
) -> Result<wgpu::ComputePipeline, KernelError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Particle Kernel"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particle Pipeline Layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("Particle Pipeline"),
        layout: Some(&pipeline_layout),
        module: &module,
        entry_point: Some(KERNEL_ENTRY_POINT),
        compilation_options: Default::default(),
        cache: None,
    });

    if let Some(error) = device.pop_error_scope().await {
        let log = error.to_string();
        tracing::error!(device = %adapter_info.name, "kernel build failed:\n{log}");
        return Err(KernelError::Compile(log));
    }

    tracing::info!(device = %adapter_info.name, "kernel build succeeded");
    Ok(pipeline)
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_seeding_clears_flags_and_stays_in_unit_interval() {
        let mut values = vec![7.0; 4096];
        let mut flags = vec![1; 4096];
        seed_random_numbers(&mut values, &mut flags, &mut rng());

        assert!(flags.iter().all(|&f| f == 0));
        assert!(values.iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_reseed_replaces_only_flagged_values() {
        let mut rng = rng();
        let mut values = vec![0.0; 1000];
        let mut flags = vec![0; 1000];
        seed_random_numbers(&mut values, &mut flags, &mut rng);

        for i in (0..1000).step_by(3) {
            flags[i] = 1;
        }
        let before = values.clone();
        let flagged_before = flags.clone();

        let reseeded = reseed_flagged(&mut values, &mut flags, &mut rng);

        assert_eq!(reseeded, flagged_before.iter().filter(|&&f| f != 0).count());
        for i in 0..1000 {
            assert_eq!(flags[i], 0);
            if flagged_before[i] != 0 {
                assert_ne!(values[i], before[i]);
                assert!((0.0..1.0).contains(&values[i]));
            } else {
                assert_eq!(values[i], before[i]);
            }
        }
    }

    #[test]
    fn test_reseed_without_flags_is_a_no_op() {
        let mut values = vec![0.25, 0.5, 0.75];
        let mut flags = vec![0; 3];
        assert_eq!(reseed_flagged(&mut values, &mut flags, &mut rng()), 0);
        assert_eq!(values, vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_any_nonzero_flag_counts_as_set() {
        let mut values = vec![0.5, 0.5];
        let mut flags = vec![u32::MAX, 0];
        assert_eq!(reseed_flagged(&mut values, &mut flags, &mut rng()), 1);
        assert_eq!(flags, vec![0, 0]);
    }

    #[test]
    fn test_reference_configuration_dispatches_every_particle() {
        let config = EngineConfig::default();
        assert_eq!(config.particle_count, PARTICLE_COUNT);
        assert_eq!(config.window_size, WINDOW_SIZE);
        assert!(!config.allow_software_adapter);
    }

    #[test]
    fn test_gpu_param_layouts_match_kernel() {
        assert_eq!(std::mem::size_of::<ParticleParams>(), 16);
        assert_eq!(std::mem::size_of::<ViewportParams>(), 16);
    }

    #[test]
    fn test_missing_kernel_is_an_io_error() {
        let err = load_kernel_source(Path::new("kernels/does_not_exist.wgsl"), &VectorField::zero())
            .unwrap_err();
        assert!(matches!(err, KernelError::Io { .. }));
    }

    fn scatter_from_origin(field: &VectorField, count: u32, range: i32, rng: &mut StdRng) -> (Vec<Vec2>, Vec<f32>, Vec<u32>) {
        let mut seeds = vec![0.0; count as usize];
        let mut flags = vec![0; count as usize];
        seed_random_numbers(&mut seeds, &mut flags, rng);

        let positions = (0..count)
            .map(|i| {
                let (next, flagged) =
                    step_particle(field, Vec2::ZERO, Vec2::ZERO, range, seeds[i as usize], i, true);
                flags[i as usize] = u32::from(flagged);
                next
            })
            .collect();
        (positions, seeds, flags)
    }

    fn distinct_positions(positions: &[Vec2]) -> usize {
        let mut keys: Vec<(u32, u32)> = positions
            .iter()
            .map(|p| (p.x.to_bits(), p.y.to_bits()))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }

    fn inside(p: Vec2, origin: Vec2, range: i32) -> bool {
        let half = range as f32 * 0.5;
        (p - origin).abs().cmple(Vec2::splat(half)).all()
    }

    #[test]
    fn test_step_scale_matches_kernel() {
        let kernel = std::fs::read_to_string(KERNEL_FILE_PATH).unwrap();
        assert!(kernel.contains(&format!("const STEP_SCALE: f32 = {STEP_SCALE:?};")));
    }

    #[test]
    fn test_particles_at_a_fixed_point_stay_without_scatter() {
        // Every preset has a fixed point at the origin, where zeroed
        // positions start.
        for field in [
            VectorField::rotation(),
            VectorField::saddle(),
            VectorField::source(),
            VectorField::sink(),
            VectorField::waves(),
        ] {
            let (next, flagged) = step_particle(&field, Vec2::ZERO, Vec2::ZERO, 10, 0.3, 0, false);
            assert_eq!(next, Vec2::ZERO);
            assert!(!flagged);
        }
    }

    #[test]
    fn test_first_dispatch_spreads_particles_over_viewport() {
        let mut rng = rng();
        let origin = Vec2::new(2.0, -3.0);
        let mut seeds = vec![0.0; 1000];
        let mut flags = vec![0; 1000];
        seed_random_numbers(&mut seeds, &mut flags, &mut rng);

        let positions: Vec<Vec2> = (0..1000u32)
            .map(|i| {
                let (next, flagged) = step_particle(
                    &VectorField::rotation(),
                    Vec2::ZERO,
                    origin,
                    10,
                    seeds[i as usize],
                    i,
                    true,
                );
                assert!(flagged);
                next
            })
            .collect();

        assert!(positions.iter().all(|&p| inside(p, origin, 10)));
        assert!(distinct_positions(&positions) > 900);

        // Both axes are covered, not just a line.
        let spread = |f: fn(&Vec2) -> f32| {
            let values: Vec<f32> = positions.iter().map(f).collect();
            let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            max - min
        };
        assert!(spread(|p| p.x) > 8.0);
        assert!(spread(|p| p.y) > 8.0);
    }

    #[test]
    fn test_step_leaving_viewport_raises_flag_and_relocates_inside() {
        let field = VectorField::source();
        let (next, flagged) = step_particle(&field, Vec2::new(4.99, 0.0), Vec2::ZERO, 10, 0.25, 7, false);
        assert!(flagged);
        assert!(inside(next, Vec2::ZERO, 10));
        assert_eq!(next.x, (0.25 - 0.5) * 10.0);
    }

    #[test]
    fn test_non_finite_step_counts_as_outside() {
        let field = VectorField::new(
            crate::field::BivariateFunction::new(|_| f32::NAN, "0.0"),
            crate::field::BivariateFunction::constant(0.0),
        );
        let (next, flagged) = step_particle(&field, Vec2::ONE, Vec2::ZERO, 10, 0.5, 0, false);
        assert!(flagged);
        assert!(next.is_finite());
    }

    #[test]
    fn test_rotation_flow_moves_exits_and_reseeds() {
        let field = VectorField::rotation();
        let mut rng = rng();
        let (mut positions, mut seeds, mut flags) = scatter_from_origin(&field, 500, 10, &mut rng);
        assert_eq!(reseed_flagged(&mut seeds, &mut flags, &mut rng), 500);
        let start = positions.clone();

        let mut reseeded = 0;
        for _ in 0..200 {
            for (i, p) in positions.iter_mut().enumerate() {
                let (next, flagged) =
                    step_particle(&field, *p, Vec2::ZERO, 10, seeds[i], i as u32, false);
                *p = next;
                flags[i] = u32::from(flagged);
            }
            reseeded += reseed_flagged(&mut seeds, &mut flags, &mut rng);
        }

        // Corner particles rotate out of the square viewport within a
        // quarter turn.
        assert!(reseeded > 0);
        assert!(positions.iter().all(|&p| inside(p, Vec2::ZERO, 10)));
        assert!(positions.iter().zip(&start).filter(|(a, b)| a != b).count() > 450);
        assert!(distinct_positions(&positions) > 450);
    }

    #[test]
    fn test_kernel_source_has_field_appended() {
        let source = load_kernel_source(Path::new(KERNEL_FILE_PATH), &VectorField::rotation()).unwrap();
        assert!(source.contains("fn main("));
        assert!(source.ends_with(&VectorField::rotation().to_wgsl()));
    }
}
