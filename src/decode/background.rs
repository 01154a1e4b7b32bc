use crate::foundation::core::Rgb8;
use crate::foundation::math::{be_u16, be_u32};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

const COLOR_GRAY: u8 = 0;
const COLOR_RGB: u8 = 2;
const COLOR_PALETTE: u8 = 3;
const COLOR_GRAY_ALPHA: u8 = 4;
const COLOR_RGB_ALPHA: u8 = 6;

/// Read the background color hint of a PNG, normalised to 8 bits per channel.
///
/// Walks the chunk stream up to the first `IDAT`. Returns `None` when the image carries no
/// `bKGD` chunk or when the chunk stream is malformed before one is found.
pub fn background_hint(png: &[u8]) -> Option<Rgb8> {
    if png.get(..PNG_SIGNATURE.len())? != PNG_SIGNATURE {
        return None;
    }

    let mut header: Option<(u8, u8)> = None;
    let mut palette: &[u8] = &[];
    let mut off = PNG_SIGNATURE.len();
    loop {
        let len = usize::try_from(be_u32(png, off)?).ok()?;
        let kind = png.get(off + 4..off + 8)?;
        let start = off + 8;
        let data = png.get(start..start.checked_add(len)?)?;
        match kind {
            b"IHDR" => header = Some((*data.get(8)?, *data.get(9)?)),
            b"PLTE" => palette = data,
            b"bKGD" => {
                let (depth, color) = header?;
                return decode_bkgd(data, depth, color, palette);
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        // Skip the trailing CRC.
        off = start + len + 4;
    }
}

fn decode_bkgd(data: &[u8], depth: u8, color: u8, palette: &[u8]) -> Option<Rgb8> {
    match color {
        COLOR_GRAY | COLOR_GRAY_ALPHA => {
            let v = scale_sample(be_u16(data, 0)?, depth);
            Some(Rgb8::new(v, v, v))
        }
        COLOR_RGB | COLOR_RGB_ALPHA => Some(Rgb8::new(
            scale_sample(be_u16(data, 0)?, depth),
            scale_sample(be_u16(data, 2)?, depth),
            scale_sample(be_u16(data, 4)?, depth),
        )),
        COLOR_PALETTE => {
            let i = usize::from(*data.first()?) * 3;
            let rgb = palette.get(i..i + 3)?;
            Some(Rgb8::new(rgb[0], rgb[1], rgb[2]))
        }
        _ => None,
    }
}

/// Scale a sample of `depth` bits to 8 bits.
fn scale_sample(v: u16, depth: u8) -> u8 {
    match depth {
        16 => (v >> 8) as u8,
        8 => (v & 0xFF) as u8,
        1 | 2 | 4 => {
            let max = (1u16 << depth) - 1;
            ((v.min(max) * 255) / max) as u8
        }
        _ => 0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/background.rs"]
mod tests;
