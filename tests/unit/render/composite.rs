use super::*;

const F: PixelFormat = PixelFormat::Rgb888;

fn frame(w: u32, h: u32, px: [u8; 3], bg: Option<Rgb8>) -> DecodedFrame {
    let pixels = px.repeat((w * h) as usize);
    DecodedFrame::from_packed(w, h, F, pixels, bg).unwrap()
}

fn pixel(buf: &[u8], geom: BufferGeometry, x: u32, y: u32) -> [u8; 3] {
    let i = (y * geom.stride + x) as usize * 3;
    [buf[i], buf[i + 1], buf[i + 2]]
}

#[test]
fn equal_size_is_one_bulk_copy() {
    let geom = BufferGeometry::packed(2, 2);
    let mut buf = vec![0u8; geom.byte_len(F)];
    let placed = composite(&mut buf, geom, &frame(2, 2, [7, 8, 9], None), F);
    assert_eq!(placed, Placement::Bulk);
    assert_eq!(buf, [7u8, 8, 9].repeat(4));
}

#[test]
fn larger_buffer_centers_with_truncated_offsets() {
    let geom = BufferGeometry {
        width: 5,
        height: 4,
        stride: 6,
    };
    let mut buf = vec![0u8; geom.byte_len(F)];
    let bg = Rgb8::new(1, 1, 1);
    let placed = composite(&mut buf, geom, &frame(2, 1, [9, 9, 9], Some(bg)), F);
    assert_eq!(placed, Placement::Centered { x: 1, y: 1 });

    for y in 0..4 {
        for x in 0..6 {
            let expect = if y == 1 && (1..3).contains(&x) {
                [9, 9, 9]
            } else {
                [1, 1, 1]
            };
            assert_eq!(pixel(&buf, geom, x, y), expect, "({x},{y})");
        }
    }
}

#[test]
fn no_hint_leaves_surroundings_untouched() {
    let geom = BufferGeometry::packed(3, 3);
    let mut buf = vec![0xEEu8; geom.byte_len(F)];
    composite(&mut buf, geom, &frame(1, 1, [0, 0, 0], None), F);
    assert_eq!(pixel(&buf, geom, 1, 1), [0, 0, 0]);
    assert_eq!(pixel(&buf, geom, 0, 0), [0xEE, 0xEE, 0xEE]);
    assert_eq!(pixel(&buf, geom, 2, 2), [0xEE, 0xEE, 0xEE]);
}

#[test]
fn smaller_buffer_shows_only_background() {
    let geom = BufferGeometry::packed(2, 2);
    let mut buf = vec![0u8; geom.byte_len(F)];
    let bg = Rgb8::new(4, 5, 6);
    let placed = composite(&mut buf, geom, &frame(3, 1, [9, 9, 9], Some(bg)), F);
    assert_eq!(placed, Placement::Skipped);
    assert!(!placed.drew_image());
    assert_eq!(buf, [4u8, 5, 6].repeat(4));
}

#[test]
fn short_destination_slice_is_skipped() {
    let geom = BufferGeometry::packed(4, 4);
    let mut buf = vec![0u8; 10];
    assert_eq!(
        composite(&mut buf, geom, &frame(2, 2, [1, 2, 3], None), F),
        Placement::Skipped
    );
    assert_eq!(
        composite(&mut buf, geom, &frame(4, 4, [1, 2, 3], None), F),
        Placement::Skipped
    );
}

#[test]
fn fill_solid_covers_height_times_stride() {
    let geom = BufferGeometry {
        width: 1,
        height: 2,
        stride: 2,
    };
    let mut buf = vec![0u8; geom.byte_len(PixelFormat::Rgb565) + 2];
    fill_solid(&mut buf, geom, PixelFormat::Rgb565, Rgb8::new(0xFF, 0xFF, 0xFF));
    assert_eq!(buf, [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0]);
}
