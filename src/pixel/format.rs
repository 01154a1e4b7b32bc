use crate::foundation::core::Rgb8;

/// Platform pixel format codes reported by the display provider.
pub mod hal {
    /// 32-bit RGBA.
    pub const RGBA_8888: u32 = 1;
    /// 32-bit RGB with an ignored fourth byte.
    pub const RGBX_8888: u32 = 2;
    /// 24-bit packed RGB.
    pub const RGB_888: u32 = 3;
    /// 16-bit packed RGB.
    pub const RGB_565: u32 = 4;
    /// 32-bit BGRA.
    pub const BGRA_8888: u32 = 5;
}

/// Channel layout a decoded PNG is expanded to before the row transform runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceLayout {
    /// Four bytes per pixel, alpha kept (opaque where the image has none).
    Rgba8,
    /// Three bytes per pixel, alpha and transparency discarded.
    Rgb8,
}

impl SourceLayout {
    /// Bytes per pixel of the layout.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
        }
    }
}

/// Pixel layout of a display buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// `[r, g, b, a]` in memory.
    Rgba8888,
    /// `[r, g, b, x]` in memory, `x` written as 0xFF.
    #[default]
    Rgbx8888,
    /// `[b, g, r, a]` in memory.
    Bgra8888,
    /// `[r, g, b]` in memory.
    Rgb888,
    /// Little-endian `rrrrrggg gggbbbbb`.
    Rgb565,
}

impl PixelFormat {
    /// Every supported format.
    pub const ALL: [PixelFormat; 5] = [
        Self::Rgba8888,
        Self::Rgbx8888,
        Self::Bgra8888,
        Self::Rgb888,
        Self::Rgb565,
    ];

    /// Map a provider format code. Unknown codes fall back to RGB 565.
    pub fn from_hal(code: u32) -> Self {
        match code {
            hal::RGBA_8888 => Self::Rgba8888,
            hal::RGBX_8888 => Self::Rgbx8888,
            hal::RGB_888 => Self::Rgb888,
            hal::RGB_565 => Self::Rgb565,
            hal::BGRA_8888 => Self::Bgra8888,
            other => {
                tracing::warn!(code = other, "unknown pixel format, using RGB 565");
                Self::Rgb565
            }
        }
    }

    /// Provider format code of this format.
    pub fn hal_code(self) -> u32 {
        match self {
            Self::Rgba8888 => hal::RGBA_8888,
            Self::Rgbx8888 => hal::RGBX_8888,
            Self::Bgra8888 => hal::BGRA_8888,
            Self::Rgb888 => hal::RGB_888,
            Self::Rgb565 => hal::RGB_565,
        }
    }

    /// Parse a lowercase name such as `rgbx8888` or `rgb565`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rgba8888 => "rgba8888",
            Self::Rgbx8888 => "rgbx8888",
            Self::Bgra8888 => "bgra8888",
            Self::Rgb888 => "rgb888",
            Self::Rgb565 => "rgb565",
        }
    }

    /// Bytes one pixel takes in a buffer of this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8888 | Self::Rgbx8888 | Self::Bgra8888 => 4,
            Self::Rgb888 => 3,
            Self::Rgb565 => 2,
        }
    }

    /// Layout the decoder expands source images to for this format.
    pub fn source_layout(self) -> SourceLayout {
        match self {
            Self::Rgba8888 | Self::Rgbx8888 | Self::Bgra8888 => SourceLayout::Rgba8,
            Self::Rgb888 | Self::Rgb565 => SourceLayout::Rgb8,
        }
    }

    /// Transform one decoded row from [`Self::source_layout`] into this format.
    ///
    /// Converts `min(src pixels, dst pixels)` pixels and leaves the rest of `dst` untouched.
    pub fn convert_row(self, src: &[u8], dst: &mut [u8]) {
        let src_bpp = self.source_layout().bytes_per_pixel();
        let dst_bpp = self.bytes_per_pixel();
        match self {
            Self::Rgba8888 | Self::Rgbx8888 | Self::Rgb888 => {
                let n = (src.len() / src_bpp).min(dst.len() / dst_bpp) * dst_bpp;
                dst[..n].copy_from_slice(&src[..n]);
            }
            Self::Bgra8888 => {
                for (s, d) in src.chunks_exact(src_bpp).zip(dst.chunks_exact_mut(dst_bpp)) {
                    d.copy_from_slice(&[s[2], s[1], s[0], s[3]]);
                }
            }
            Self::Rgb565 => {
                for (s, d) in src.chunks_exact(src_bpp).zip(dst.chunks_exact_mut(dst_bpp)) {
                    d.copy_from_slice(&pack_565(s[0], s[1], s[2]).to_le_bytes());
                }
            }
        }
    }

    /// Bytes of one pixel of solid `color`; matches what [`Self::convert_row`] produces for the
    /// same opaque color.
    pub fn pack(self, color: Rgb8) -> ([u8; 4], usize) {
        let Rgb8 { r, g, b } = color;
        match self {
            Self::Rgba8888 | Self::Rgbx8888 => ([r, g, b, 0xFF], 4),
            Self::Bgra8888 => ([b, g, r, 0xFF], 4),
            Self::Rgb888 => ([r, g, b, 0], 3),
            Self::Rgb565 => {
                let [lo, hi] = pack_565(r, g, b).to_le_bytes();
                ([lo, hi, 0, 0], 2)
            }
        }
    }

    /// Fill `dst` with `color`. A trailing partial pixel is left untouched.
    pub fn fill(self, dst: &mut [u8], color: Rgb8) {
        let (bytes, bpp) = self.pack(color);
        for px in dst.chunks_exact_mut(bpp) {
            px.copy_from_slice(&bytes[..bpp]);
        }
    }

    /// Expand one pixel of this format to straight RGBA8.
    pub fn unpack_rgba8(self, px: &[u8]) -> [u8; 4] {
        match self {
            Self::Rgba8888 => [px[0], px[1], px[2], px[3]],
            Self::Rgbx8888 | Self::Rgb888 => [px[0], px[1], px[2], 0xFF],
            Self::Bgra8888 => [px[2], px[1], px[0], px[3]],
            Self::Rgb565 => {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let r = ((v >> 11) & 0x1F) as u8;
                let g = ((v >> 5) & 0x3F) as u8;
                let b = (v & 0x1F) as u8;
                [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 0xFF]
            }
        }
    }

    /// Expand a tightly packed `width`-pixel row of this format into RGBA8.
    pub fn row_to_rgba8(self, src: &[u8], out: &mut Vec<u8>) {
        for px in src.chunks_exact(self.bytes_per_pixel()) {
            out.extend_from_slice(&self.unpack_rgba8(px));
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pack 8-bit channels into RGB 565 by truncation.
#[inline]
pub fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    ((u16::from(r) & 0xF8) << 8) | ((u16::from(g) & 0xFC) << 3) | (u16::from(b) >> 3)
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/format.rs"]
mod tests;
