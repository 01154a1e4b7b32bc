use crate::decode::frame::DecodedFrame;
use crate::foundation::core::Rgb8;
use crate::pixel::format::PixelFormat;

/// Shape of a locked display buffer. `stride` is in pixels and is at least `width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferGeometry {
    /// Visible width in pixels.
    pub width: u32,
    /// Visible height in pixels.
    pub height: u32,
    /// Row pitch in pixels.
    pub stride: u32,
}

impl BufferGeometry {
    /// Geometry of a buffer whose rows are tightly packed.
    pub fn packed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stride: width,
        }
    }

    /// Bytes spanned by the buffer in `format`.
    pub fn byte_len(&self, format: PixelFormat) -> usize {
        self.stride as usize * self.height as usize * format.bytes_per_pixel()
    }
}

/// How a frame ended up in the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Same size and row pitch; copied in one block.
    Bulk,
    /// Buffer at least as large in both dimensions; frame centered.
    Centered {
        /// Left offset in pixels.
        x: u32,
        /// Top offset in pixels.
        y: u32,
    },
    /// Buffer smaller than the frame in some dimension, or shorter than its geometry; nothing
    /// was copied.
    Skipped,
}

impl Placement {
    /// Whether any frame pixels were written.
    pub fn drew_image(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Fill `dst` with the frame's background hint, if any, then place the frame.
pub fn composite(
    dst: &mut [u8],
    geom: BufferGeometry,
    frame: &DecodedFrame,
    format: PixelFormat,
) -> Placement {
    if let Some(bg) = frame.background() {
        fill_solid(dst, geom, format, bg);
    }

    let bpp = format.bytes_per_pixel();
    let (w, h) = (frame.width(), frame.height());
    let row_bytes = w as usize * bpp;
    let dst_pitch = geom.stride as usize * bpp;

    if geom.height == h && geom.stride == w {
        let src = frame.image_bytes();
        let Some(out) = dst.get_mut(..src.len()) else {
            return Placement::Skipped;
        };
        out.copy_from_slice(src);
        return Placement::Bulk;
    }

    if geom.width < w || geom.height < h || geom.stride < geom.width {
        return Placement::Skipped;
    }

    let x = (geom.width - w) / 2;
    let y = (geom.height - h) / 2;
    let last_end = (y + h).saturating_sub(1) as usize * dst_pitch + x as usize * bpp + row_bytes;
    if h > 0 && dst.len() < last_end {
        return Placement::Skipped;
    }

    for row in 0..h {
        let Some(src) = frame.row(row) else {
            break;
        };
        let start = (y + row) as usize * dst_pitch + x as usize * bpp;
        dst[start..start + row_bytes].copy_from_slice(src);
    }
    Placement::Centered { x, y }
}

/// Fill the `height * stride` pixel region of `dst` with `color`.
pub fn fill_solid(dst: &mut [u8], geom: BufferGeometry, format: PixelFormat, color: Rgb8) {
    let len = geom.byte_len(format).min(dst.len());
    format.fill(&mut dst[..len], color);
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
