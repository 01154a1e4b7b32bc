use super::*;
use crate::display::provider::GraphicBuffer;
use crate::pixel::format::hal;
use crate::render::composite::BufferGeometry;

#[test]
fn writes_numbered_pngs_per_display() {
    let dir = tempfile::tempdir().unwrap();
    let primary = DisplaySpec::new(BufferGeometry::packed(2, 1), hal::RGB_565);
    let mut d = PngSequenceDisplay::new(dir.path(), primary, None).unwrap();
    assert!(!dir.path().join("external").exists());

    for _ in 0..2 {
        let mut buf = d.dequeue_buffer(DisplayTarget::Primary).unwrap();
        let region = Region::full(buf.geometry());
        d.lock(&mut buf, BufferUsage::ANIMATION, region)
            .unwrap()
            .fill(0xFF);
        d.unlock(&mut buf).unwrap();
        d.queue_buffer(DisplayTarget::Primary, buf).unwrap();
    }

    assert_eq!(d.written(DisplayTarget::Primary), 2);
    let second = dir.path().join("primary").join("00001.png");
    let img = image::open(&second).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
}

#[test]
fn external_directory_exists_when_attached() {
    let dir = tempfile::tempdir().unwrap();
    let spec = DisplaySpec::new(BufferGeometry::packed(1, 1), hal::RGBA_8888);
    let d = PngSequenceDisplay::new(dir.path().join("out"), spec, Some(spec)).unwrap();
    assert!(d.out_dir().join("external").is_dir());
    assert!(d.is_external_enabled());
}
