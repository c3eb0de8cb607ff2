//! wgpu-backed [`Canvas`] for the visualizer window.
//!
//! Draw calls are tessellated into one coloured triangle list in call order
//! and submitted in a single render pass by [`GpuCanvas::present`].

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use winit::window::Window;

use crate::canvas::{Canvas, Rect, Vertex};
use crate::color::{Color, BACKGROUND_COLOUR};
use crate::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::error::GpuError;

const CANVAS_SHADER: &str = r#"
struct Screen {
    size: vec2<f32>,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> screen: Screen;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
    var out: VertexOutput;
    let ndc = position / screen.size * 2.0 - 1.0;
    out.clip_position = vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

const LINE_WIDTH: f32 = 1.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CanvasVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl CanvasVertex {
    fn new(position: Vec2, color: Color) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ScreenUniform {
    size: [f32; 2],
    _padding: [f32; 2],
}

/// CPU side of the canvas: accumulates triangles for one frame.
#[derive(Debug, Clone)]
pub struct VertexBatch {
    vertices: Vec<CanvasVertex>,
    draw_color: Color,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            draw_color: Color::rgb(255, 255, 255),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[CanvasVertex] {
        &self.vertices
    }

    fn push_quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: Color) {
        // a-b-c-d winds around the quad.
        for p in [a, b, c, a, c, d] {
            self.vertices.push(CanvasVertex::new(p, color));
        }
    }
}

impl Default for VertexBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for VertexBatch {
    fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        let color = self.draw_color;
        let Some(direction) = (to - from).try_normalize() else {
            let dot = Rect::centred(from, LINE_WIDTH);
            self.fill_rects(&[dot]);
            return;
        };
        let offset = direction.perp() * (LINE_WIDTH * 0.5);
        self.push_quad(from + offset, to + offset, to - offset, from - offset, color);
    }

    fn fill_rects(&mut self, rects: &[Rect]) {
        let color = self.draw_color;
        self.vertices.reserve(rects.len() * 6);
        for rect in rects {
            let min = Vec2::new(rect.x, rect.y);
            let max = min + Vec2::new(rect.w, rect.h);
            self.push_quad(
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
                color,
            );
        }
    }

    fn draw_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) {
        for triangle in indices.chunks_exact(3) {
            let corners = triangle.iter().map(|&i| vertices.get(i as usize));
            let corners: Option<Vec<&Vertex>> = corners.collect();
            match corners {
                Some(corners) => self.vertices.extend(
                    corners
                        .into_iter()
                        .map(|v| CanvasVertex::new(v.position, v.color)),
                ),
                None => tracing::warn!(?triangle, "skipping triangle with out-of-range index"),
            }
        }
    }
}

/// Window surface plus the pipeline that draws a [`VertexBatch`] onto it.
pub struct GpuCanvas {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    screen_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    batch: VertexBatch,
}

impl GpuCanvas {
    /// Blocking wrapper around [`new_async`](Self::new_async).
    pub fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async(window))
    }

    pub async fn new_async(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Canvas Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Palette colours are authored as display values, so skip sRGB
        // encoding when the surface allows it.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Draw calls use logical pixels; the uniform maps them onto the
        // surface whatever its physical size.
        let screen = ScreenUniform {
            size: [WINDOW_WIDTH, WINDOW_HEIGHT],
            _padding: [0.0; 2],
        };
        let screen_buffer = wgpu::util::DeviceExt::create_buffer_init(
            &device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Screen Uniform Buffer"),
                contents: bytemuck::bytes_of(&screen),
                usage: wgpu::BufferUsages::UNIFORM,
            },
        );

        let screen_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Screen Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Screen Bind Group"),
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Canvas Shader"),
            source: wgpu::ShaderSource::Wgsl(CANVAS_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Canvas Pipeline Layout"),
            bind_group_layouts: &[&screen_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Canvas Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<CanvasVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2, // position
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x4, // color
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = create_vertex_buffer(&device, 1024);

        tracing::debug!(format = ?config.format, "canvas surface configured");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            screen_bind_group,
            vertex_buffer,
            batch: VertexBatch::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Discard the previous frame's draw calls.
    pub fn begin_frame(&mut self) {
        self.batch.clear();
    }

    /// Clear to the background colour, draw everything batched since
    /// [`begin_frame`](Self::begin_frame) and present.
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let vertices = self.batch.vertices();
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.len() as u64 > self.vertex_buffer.size() {
            let capacity = vertices.len().next_power_of_two() as u64;
            self.vertex_buffer = create_vertex_buffer(&self.device, capacity);
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.vertex_buffer, 0, bytes);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Canvas Encoder"),
            });

        {
            let [r, g, b, a] = BACKGROUND_COLOUR.to_array().map(f64::from);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !vertices.is_empty() {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.screen_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..bytes.len() as u64));
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Canvas for GpuCanvas {
    fn set_draw_color(&mut self, color: Color) {
        self.batch.set_draw_color(color);
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        self.batch.draw_line(from, to);
    }

    fn fill_rects(&mut self, rects: &[Rect]) {
        self.batch.fill_rects(rects);
    }

    fn draw_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) {
        self.batch.draw_geometry(vertices, indices);
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Canvas Vertex Buffer"),
        size: vertex_capacity * std::mem::size_of::<CanvasVertex>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{FOREGROUND_COLOUR, PARTICLE_COLOUR};

    fn positions(batch: &VertexBatch) -> Vec<Vec2> {
        batch
            .vertices()
            .iter()
            .map(|v| Vec2::from_array(v.position))
            .collect()
    }

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<CanvasVertex>(), 24);
        assert_eq!(std::mem::size_of::<ScreenUniform>(), 16);
    }

    #[test]
    fn test_rect_becomes_two_triangles_in_draw_color() {
        let mut batch = VertexBatch::new();
        batch.set_draw_color(PARTICLE_COLOUR);
        batch.fill_rects(&[Rect::new(10.0, 20.0, 3.0, 3.0)]);

        let corners = positions(&batch);
        assert_eq!(corners.len(), 6);
        assert!(corners.contains(&Vec2::new(10.0, 20.0)));
        assert!(corners.contains(&Vec2::new(13.0, 23.0)));
        assert!(batch
            .vertices()
            .iter()
            .all(|v| v.color == PARTICLE_COLOUR.to_array()));
    }

    #[test]
    fn test_line_quad_spans_its_endpoints() {
        let mut batch = VertexBatch::new();
        batch.set_draw_color(FOREGROUND_COLOUR);
        batch.draw_line(Vec2::new(0.0, 5.0), Vec2::new(100.0, 5.0));

        let corners = positions(&batch);
        assert_eq!(corners.len(), 6);
        for p in corners {
            assert!(p.x == 0.0 || p.x == 100.0);
            assert!((p.y - 5.0).abs() <= LINE_WIDTH * 0.5 + f32::EPSILON);
        }
    }

    #[test]
    fn test_degenerate_line_draws_a_dot() {
        let mut batch = VertexBatch::new();
        batch.draw_line(Vec2::splat(4.0), Vec2::splat(4.0));
        assert_eq!(batch.vertices().len(), 6);
    }

    #[test]
    fn test_geometry_keeps_vertex_colours_and_skips_bad_indices() {
        let red = Color::rgb(255, 0, 0);
        let vertices = [
            Vertex { position: Vec2::ZERO, color: red },
            Vertex { position: Vec2::X, color: red },
            Vertex { position: Vec2::Y, color: red },
        ];
        let mut batch = VertexBatch::new();
        batch.set_draw_color(FOREGROUND_COLOUR);
        batch.draw_geometry(&vertices, &[0, 1, 2, 0, 1, 9, 2, 1]);

        assert_eq!(positions(&batch), vec![Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert!(batch.vertices().iter().all(|v| v.color == red.to_array()));
    }

    #[test]
    fn test_call_order_is_preserved() {
        let mut batch = VertexBatch::new();
        batch.fill_rects(&[Rect::new(0.0, 0.0, 1.0, 1.0)]);
        batch.draw_line(Vec2::new(50.0, 50.0), Vec2::new(60.0, 50.0));

        let corners = positions(&batch);
        assert!(corners[..6].iter().all(|p| p.x <= 1.0));
        assert!(corners[6..].iter().all(|p| p.x >= 50.0));

        batch.clear();
        assert!(batch.vertices().is_empty());
    }
}
