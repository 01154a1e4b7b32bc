use std::io::Cursor;

use anyhow::Context;

use crate::decode::background::background_hint;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::pixel::format::{PixelFormat, SourceLayout};

/// One frame decoded into a display pixel format.
///
/// Rows are tightly packed; the buffer holds one spare row past `height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
    background: Option<Rgb8>,
}

impl DecodedFrame {
    /// Wrap tightly packed pixels already in `format`; the spare row is appended.
    pub fn from_packed(
        width: u32,
        height: u32,
        format: PixelFormat,
        mut pixels: Vec<u8>,
        background: Option<Rgb8>,
    ) -> BootAnimResult<Self> {
        let row = width as usize * format.bytes_per_pixel();
        let expected = row * height as usize;
        if pixels.len() != expected {
            return Err(BootAnimError::decode(format!(
                "expected {expected} bytes for {width}x{height} {format}, got {}",
                pixels.len()
            )));
        }
        pixels.resize(expected + row, 0);
        Ok(Self {
            width,
            height,
            format,
            pixels,
            background,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels, spare row excluded.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Format the pixels were converted to.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per pixel of [`Self::format`].
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Length of one packed row in bytes.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Whole pixel buffer, spare row included.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixels of the visible rows only.
    pub fn image_bytes(&self) -> &[u8] {
        &self.pixels[..self.row_bytes() * self.height as usize]
    }

    /// Row `y`, or `None` past the visible height.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.row_bytes();
        let start = y as usize * stride;
        self.pixels.get(start..start + stride)
    }

    /// Background color hint carried by the image, if any.
    pub fn background(&self) -> Option<Rgb8> {
        self.background
    }
}

/// Decode a PNG payload into `format`.
///
/// Rows are converted as the decoder yields them, straight into the frame buffer; only one
/// source row is held at a time. Interlaced images are the exception and are reassembled
/// before conversion. The payload is read through a cursor over the borrowed bytes, so a
/// truncated image fails instead of reading past the slice. Nothing is cached on failure.
pub fn decode_frame(bytes: &[u8], format: PixelFormat) -> BootAnimResult<DecodedFrame> {
    let (width, height, pixels) =
        decode_rows(bytes, format).map_err(|err| BootAnimError::decode(format!("{err:#}")))?;
    let background = background_hint(bytes);

    tracing::debug!(
        width,
        height,
        %format,
        background = ?background,
        "decoded frame"
    );

    Ok(DecodedFrame {
        width,
        height,
        format,
        pixels,
        background,
    })
}

/// Destination of converted rows: the frame buffer plus one scratch source row.
struct RowSink {
    format: PixelFormat,
    layout: SourceLayout,
    color: png::ColorType,
    stride: usize,
    scratch: Vec<u8>,
    pixels: Vec<u8>,
}

impl RowSink {
    fn put(&mut self, y: usize, src: &[u8]) -> anyhow::Result<()> {
        let start = y * self.stride;
        let Some(dst) = self.pixels.get_mut(start..start + self.stride) else {
            anyhow::bail!("row {y} is past the declared height");
        };
        expand_row(src, self.color, self.layout, &mut self.scratch)?;
        self.format.convert_row(&self.scratch, dst);
        Ok(())
    }
}

fn decode_rows(bytes: &[u8], format: PixelFormat) -> anyhow::Result<(u32, u32, Vec<u8>)> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().context("read frame header")?;
    let (width, height, interlaced) = {
        let info = reader.info();
        (info.width, info.height, info.interlaced)
    };
    let (color, _) = reader.output_color_type();

    let layout = format.source_layout();
    let stride = (width as usize)
        .checked_mul(format.bytes_per_pixel())
        .context("frame row too large")?;
    let len = stride
        .checked_mul(height as usize + 1)
        .context("frame too large")?;
    let mut sink = RowSink {
        format,
        layout,
        color,
        stride,
        scratch: Vec::with_capacity(width as usize * layout.bytes_per_pixel()),
        pixels: vec![0u8; len],
    };

    let rows = if interlaced {
        let mut whole = vec![0u8; reader.output_buffer_size()];
        let out = reader.next_frame(&mut whole).context("decode interlaced frame")?;
        let mut rows = 0;
        for (y, src) in whole[..out.buffer_size()].chunks_exact(out.line_size).enumerate() {
            sink.put(y, src)?;
            rows += 1;
        }
        rows
    } else {
        let mut rows = 0;
        while let Some(row) = reader.next_row().context("decode frame row")? {
            sink.put(rows, row.data())?;
            rows += 1;
        }
        rows
    };
    anyhow::ensure!(rows == height as usize, "frame ended after {rows} of {height} rows");

    Ok((width, height, sink.pixels))
}

/// Normalise one decoded row to `layout`. Gray is replicated and missing alpha is opaque.
fn expand_row(
    src: &[u8],
    color: png::ColorType,
    layout: SourceLayout,
    out: &mut Vec<u8>,
) -> anyhow::Result<()> {
    out.clear();
    let channels = match (color, layout) {
        (png::ColorType::Rgba, SourceLayout::Rgba8)
        | (png::ColorType::Rgb, SourceLayout::Rgb8) => {
            out.extend_from_slice(src);
            return Ok(());
        }
        (png::ColorType::Grayscale, _) => 1,
        (png::ColorType::GrayscaleAlpha, _) => 2,
        (png::ColorType::Rgb, _) => 3,
        (png::ColorType::Rgba, _) => 4,
        (other, _) => anyhow::bail!("unexpected {other:?} rows after expansion"),
    };
    for px in src.chunks_exact(channels) {
        let [r, g, b, a] = match *px {
            [v] => [v, v, v, 0xFF],
            [v, a] => [v, v, v, a],
            [r, g, b] => [r, g, b, 0xFF],
            [r, g, b, a] => [r, g, b, a],
            _ => continue,
        };
        match layout {
            SourceLayout::Rgba8 => out.extend_from_slice(&[r, g, b, a]),
            SourceLayout::Rgb8 => out.extend_from_slice(&[r, g, b]),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/decode/frame.rs"]
mod tests;
