use std::ops::BitOr;

use crate::foundation::core::DisplayTarget;
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::pixel::format::PixelFormat;
use crate::render::composite::BufferGeometry;

/// Buffer lock usage bits, as understood by the display provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferUsage(pub u32);

impl BufferUsage {
    /// No CPU reads.
    pub const SW_READ_NEVER: Self = Self(0x0000_0000);
    /// Frequent CPU writes.
    pub const SW_WRITE_OFTEN: Self = Self(0x0000_0030);
    /// Buffer is scanned out by the framebuffer.
    pub const HW_FB: Self = Self(0x0000_1000);

    /// Usage the animation locks every buffer with.
    pub const ANIMATION: Self =
        Self(Self::SW_READ_NEVER.0 | Self::SW_WRITE_OFTEN.0 | Self::HW_FB.0);

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for BufferUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Rectangle of a buffer to lock, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// The whole visible area of `geom`.
    pub fn full(geom: BufferGeometry) -> Self {
        Self {
            x: 0,
            y: 0,
            width: geom.width,
            height: geom.height,
        }
    }

    /// Whether the region lies within `geom`.
    pub fn fits(&self, geom: BufferGeometry) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= geom.width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= geom.height)
    }
}

/// A renderable buffer handed out by a [`DisplayProvider`].
pub trait GraphicBuffer {
    /// Dimensions and row pitch of the buffer.
    fn geometry(&self) -> BufferGeometry;
}

/// External service that owns the display pipelines.
///
/// Buffers are dequeued, locked for CPU writes, unlocked and queued back for presentation.
/// A `None` from [`DisplayProvider::dequeue_buffer`] or an error from any other call is a
/// transient failure for that one frame.
pub trait DisplayProvider {
    /// Buffer type handed out by this provider.
    type Buffer: GraphicBuffer;

    /// Native pixel format code of `target` (see [`crate::pixel::format::hal`]).
    fn native_format(&self, target: DisplayTarget) -> u32;

    /// Whether an external display is connected and should be driven.
    fn is_external_enabled(&self) -> bool;

    /// Next free buffer of `target`, or `None` when none can be had.
    fn dequeue_buffer(&mut self, target: DisplayTarget) -> Option<Self::Buffer>;

    /// Hand `buffer` back for presentation on `target`.
    fn queue_buffer(&mut self, target: DisplayTarget, buffer: Self::Buffer) -> BootAnimResult<()>;

    /// Map `region` of `buffer` for CPU access. The returned slice covers the buffer from its
    /// first pixel with `stride * height` pixels.
    fn lock<'b>(
        &mut self,
        buffer: &'b mut Self::Buffer,
        usage: BufferUsage,
        region: Region,
    ) -> BootAnimResult<&'b mut [u8]>;

    /// End CPU access started by [`DisplayProvider::lock`].
    fn unlock(&mut self, buffer: &mut Self::Buffer) -> BootAnimResult<()>;

    /// Keep vsync on for the whole animation, or hand it back.
    fn set_vsync_always_enabled(&mut self, _enabled: bool) {}

    /// Called once the animation worker has exited.
    fn notify_animation_stopped(&mut self) {}
}

/// Heap-backed buffer used by the software providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoftwareBuffer {
    geometry: BufferGeometry,
    format: PixelFormat,
    data: Vec<u8>,
    locked: bool,
}

impl SoftwareBuffer {
    /// Zeroed buffer of `geometry` in `format`.
    pub fn new(geometry: BufferGeometry, format: PixelFormat) -> Self {
        Self {
            geometry,
            format,
            data: vec![0; geometry.byte_len(format)],
            locked: false,
        }
    }

    /// Format the buffer was allocated in.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw contents, `stride * height` pixels.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the buffer is currently locked for CPU access.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Visible pixels as tightly packed straight RGBA8.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let BufferGeometry {
            width,
            height,
            stride,
        } = self.geometry;
        let bpp = self.format.bytes_per_pixel();
        let mut out = Vec::with_capacity(width as usize * height as usize * 4);
        for row in self.data.chunks_exact(stride as usize * bpp).take(height as usize) {
            self.format.row_to_rgba8(&row[..width as usize * bpp], &mut out);
        }
        out
    }

    pub(crate) fn lock_region(
        &mut self,
        usage: BufferUsage,
        region: Region,
    ) -> BootAnimResult<&mut [u8]> {
        if self.locked {
            return Err(BootAnimError::buffer("buffer is already locked"));
        }
        if !usage.contains(BufferUsage::SW_WRITE_OFTEN) {
            return Err(BootAnimError::buffer(format!(
                "lock usage {:#x} does not allow cpu writes",
                usage.0
            )));
        }
        if !region.fits(self.geometry) {
            return Err(BootAnimError::buffer(format!(
                "lock region {region:?} exceeds {}x{} buffer",
                self.geometry.width, self.geometry.height
            )));
        }
        self.locked = true;
        Ok(&mut self.data)
    }

    pub(crate) fn release_lock(&mut self) -> BootAnimResult<()> {
        if !self.locked {
            return Err(BootAnimError::buffer("unlock of a buffer that is not locked"));
        }
        self.locked = false;
        Ok(())
    }
}

impl GraphicBuffer for SoftwareBuffer {
    fn geometry(&self) -> BufferGeometry {
        self.geometry
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/provider.rs"]
mod tests;
