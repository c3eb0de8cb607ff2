//! Error types for fieldflow.
//!
//! Setup failures (no adapter, missing or broken kernel) are returned to the
//! caller rather than exiting, so the bootstrap decides what is fatal.

use std::fmt;
use std::path::PathBuf;

/// Errors from GPU device setup and buffer access.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// Failed to map buffer for reading.
    BufferMapping(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

impl From<wgpu::BufferAsyncError> for GpuError {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        GpuError::BufferMapping(e.to_string())
    }
}

/// Errors loading or compiling the particle kernel.
#[derive(Debug)]
pub enum KernelError {
    /// Failed to read the kernel source file.
    Io { path: PathBuf, source: std::io::Error },
    /// The kernel failed shader validation. Holds the compiler diagnostic.
    Compile(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Io { path, source } => {
                write!(f, "Failed to read kernel source {}: {}", path.display(), source)
            }
            KernelError::Compile(log) => write!(f, "Kernel failed to compile:\n{}", log),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Io { source, .. } => Some(source),
            KernelError::Compile(_) => None,
        }
    }
}

/// Errors from building the particle engine.
#[derive(Debug)]
pub enum EngineError {
    /// Device setup failed.
    Gpu(GpuError),
    /// Kernel could not be loaded or compiled.
    Kernel(KernelError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Gpu(e) => write!(f, "GPU error: {}", e),
            EngineError::Kernel(e) => write!(f, "Kernel error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Gpu(e) => Some(e),
            EngineError::Kernel(e) => Some(e),
        }
    }
}

impl From<GpuError> for EngineError {
    fn from(e: GpuError) -> Self {
        EngineError::Gpu(e)
    }
}

impl From<KernelError> for EngineError {
    fn from(e: KernelError) -> Self {
        EngineError::Kernel(e)
    }
}

/// Errors that can occur when running the visualizer.
#[derive(Debug)]
pub enum VisualizerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// Drawing surface setup failed.
    Gpu(GpuError),
    /// Particle engine setup failed.
    Engine(EngineError),
}

impl fmt::Display for VisualizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualizerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            VisualizerError::Window(e) => write!(f, "Failed to create window: {}", e),
            VisualizerError::Gpu(e) => write!(f, "GPU error: {}", e),
            VisualizerError::Engine(e) => write!(f, "Particle engine error: {}", e),
        }
    }
}

impl std::error::Error for VisualizerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VisualizerError::EventLoop(e) => Some(e),
            VisualizerError::Window(e) => Some(e),
            VisualizerError::Gpu(e) => Some(e),
            VisualizerError::Engine(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for VisualizerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        VisualizerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for VisualizerError {
    fn from(e: winit::error::OsError) -> Self {
        VisualizerError::Window(e)
    }
}

impl From<GpuError> for VisualizerError {
    fn from(e: GpuError) -> Self {
        VisualizerError::Gpu(e)
    }
}

impl From<EngineError> for VisualizerError {
    fn from(e: EngineError) -> Self {
        VisualizerError::Engine(e)
    }
}
