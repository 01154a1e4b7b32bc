//! Fixture builders shared by the unit tests.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::archive::writer::StoredArchiveWriter;

/// Solid-color RGB PNG.
pub(crate) fn png_rgb(w: u32, h: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb(rgb));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Stored archive holding `desc.txt` plus `frames`.
pub(crate) fn archive_bytes(script: &str, frames: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut w = StoredArchiveWriter::new();
    w.add_file("desc.txt", script.as_bytes()).unwrap();
    for (name, data) in frames {
        w.add_file(name, data).unwrap();
    }
    w.finish().unwrap()
}

/// Write [`archive_bytes`] to `dir/name`.
pub(crate) fn write_archive(
    dir: &Path,
    name: &str,
    script: &str,
    frames: &[(&str, Vec<u8>)],
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, archive_bytes(script, frames)).unwrap();
    path
}
