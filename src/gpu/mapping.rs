//! Scoped buffer mapping.
//!
//! A mapped range is only valid until the buffer is unmapped. These guards
//! tie the two together: the view lives inside the guard and the buffer is
//! unmapped when the guard drops, on every exit path.

use std::ops::{Deref, DerefMut};
use std::sync::mpsc;

use bytemuck::Pod;

use crate::error::GpuError;

/// Read-only view of a mapped buffer. Unmaps on drop.
pub struct MappedBuffer<'a> {
    buffer: &'a wgpu::Buffer,
    view: Option<wgpu::BufferView<'a>>,
}

impl<'a> MappedBuffer<'a> {
    /// Map a `MAP_READ` buffer, blocking until pending GPU work that touches
    /// it has finished.
    pub fn read(device: &wgpu::Device, buffer: &'a wgpu::Buffer) -> Result<Self, GpuError> {
        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        receiver
            .recv()
            .map_err(|_| GpuError::BufferMapping("map callback never ran".into()))??;

        Ok(Self {
            buffer,
            view: Some(slice.get_mapped_range()),
        })
    }

    /// The mapped bytes reinterpreted as `T`.
    pub fn as_slice<T: Pod>(&self) -> &[T] {
        bytemuck::cast_slice(&self[..])
    }
}

impl Deref for MappedBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.view.as_deref().unwrap_or(&[])
    }
}

impl Drop for MappedBuffer<'_> {
    fn drop(&mut self) {
        // The view must go before the unmap.
        self.view.take();
        self.buffer.unmap();
    }
}

/// Writable view of a buffer created with `mapped_at_creation`. Unmaps on
/// drop, handing the contents to the GPU.
pub struct MappedBufferMut<'a> {
    buffer: &'a wgpu::Buffer,
    view: Option<wgpu::BufferViewMut<'a>>,
}

impl<'a> MappedBufferMut<'a> {
    pub fn at_creation(buffer: &'a wgpu::Buffer) -> Self {
        Self {
            buffer,
            view: Some(buffer.slice(..).get_mapped_range_mut()),
        }
    }

    pub fn as_mut_slice<T: Pod>(&mut self) -> &mut [T] {
        bytemuck::cast_slice_mut(&mut self[..])
    }
}

impl Deref for MappedBufferMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.view.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for MappedBufferMut<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.view.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for MappedBufferMut<'_> {
    fn drop(&mut self) {
        self.view.take();
        self.buffer.unmap();
    }
}
