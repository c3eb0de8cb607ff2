//! Windowed visualizer: a [`Plot`] with the particle flow drawn over it.

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::color::Palette;
use crate::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::error::VisualizerError;
use crate::field::VectorField;
use crate::gpu::{EngineConfig, GpuCanvas, ParticleEngine};
use crate::input::Input;
use crate::plot::Plot;

/// Builder for the visualizer window.
///
/// # Example
///
/// ```ignore
/// use fieldflow::prelude::*;
///
/// Visualizer::new(VectorField::rotation())
///     .with_title("Rotation")
///     .with_palette(Palette::Viridis)
///     .run()?;
/// ```
pub struct Visualizer {
    field: VectorField,
    title: String,
    palette: Palette,
    engine_config: EngineConfig,
}

impl Visualizer {
    pub fn new(field: VectorField) -> Self {
        Self {
            field,
            title: "fieldflow".to_string(),
            palette: Palette::default(),
            engine_config: EngineConfig::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_kernel_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine_config = self.engine_config.with_kernel_path(path);
        self
    }

    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.engine_config = self.engine_config.with_particle_count(count);
        self
    }

    /// Run on a software adapter if no hardware GPU is found.
    pub fn allow_software_adapter(mut self) -> Self {
        self.engine_config = self.engine_config.with_software_adapter(true);
        self
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine_config
    }

    /// Particle count passed to every engine update.
    pub fn frame_particle_count(&self) -> u32 {
        self.engine_config.particle_count
    }

    /// Open the window and run until it is closed.
    ///
    /// Setup failures (window, surface, adapter, kernel) end the loop and are
    /// returned here.
    pub fn run(self) -> Result<(), VisualizerError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Frame {
    window: Arc<Window>,
    canvas: GpuCanvas,
    engine: ParticleEngine,
}

struct App {
    title: String,
    frame_particle_count: u32,
    engine_config: EngineConfig,
    plot: Plot,
    input: Input,
    frame: Option<Frame>,
    error: Option<VisualizerError>,
}

impl App {
    fn new(visualizer: Visualizer) -> Self {
        Self {
            frame_particle_count: visualizer.frame_particle_count(),
            title: visualizer.title,
            engine_config: visualizer.engine_config,
            plot: Plot::new(visualizer.field, visualizer.palette),
            input: Input::default(),
            frame: None,
            error: None,
        }
    }

    fn create_frame(&mut self, event_loop: &ActiveEventLoop) -> Result<Frame, VisualizerError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.input.set_scale_factor(window.scale_factor());

        let canvas = GpuCanvas::new(window.clone())?;
        let engine = ParticleEngine::new(self.plot.field(), &self.engine_config)?;

        Ok(Frame {
            window,
            canvas,
            engine,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame) = &mut self.frame else {
            return;
        };

        self.plot.update();

        let viewport = self.plot.viewport();
        if let Err(e) = frame.engine.update(
            self.frame_particle_count,
            viewport.cartesian_origin(),
            viewport.range(),
        ) {
            tracing::error!("particle update failed: {e}");
        }

        frame.canvas.begin_frame();
        self.plot.draw(&mut frame.canvas);
        if let Err(e) = frame.engine.draw(&mut frame.canvas) {
            tracing::error!("particle draw failed: {e}");
        }

        match frame.canvas.present() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                frame.canvas.resize(frame.window.inner_size());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory");
                event_loop.exit();
            }
            Err(e) => tracing::warn!("render error: {e:?}"),
        }

        frame.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.frame.is_some() {
            return;
        }
        match self.create_frame(event_loop) {
            Ok(frame) => {
                frame.window.request_redraw();
                self.frame = Some(frame);
            }
            Err(e) => {
                tracing::error!("{e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(pointer) = self.input.handle_event(&event) {
            self.plot.handle_pointer(pointer);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(frame) = &mut self.frame {
                    frame.canvas.resize(physical_size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.input.set_scale_factor(scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
