use super::*;
use crate::display::memory::{DisplaySpec, InMemoryDisplay};
use crate::pixel::format::hal;
use crate::render::composite::BufferGeometry;

fn display() -> InMemoryDisplay {
    let geom = BufferGeometry {
        width: 2,
        height: 2,
        stride: 3,
    };
    InMemoryDisplay::new(DisplaySpec::new(geom, hal::RGBX_8888))
}

#[test]
fn fills_whole_stride_with_color() {
    let mut d = display();
    show_solid_color_frame(
        &mut d,
        DisplayTarget::Primary,
        PixelFormat::Rgbx8888,
        Rgb8::BLACK,
    )
    .unwrap();

    let shown = &d.presented()[0];
    assert_eq!(shown.target, DisplayTarget::Primary);
    assert_eq!(shown.buffer.data(), [0u8, 0, 0, 0xFF].repeat(6));
}

#[test]
fn missing_buffer_is_a_buffer_error() {
    let mut d = display().fail_all_dequeues();
    let err = show_solid_color_frame(
        &mut d,
        DisplayTarget::Primary,
        PixelFormat::Rgbx8888,
        Rgb8::BLACK,
    )
    .unwrap_err();
    assert!(matches!(err, BootAnimError::Buffer(_)));
    assert!(d.presented().is_empty());
}

#[test]
fn lock_failure_still_returns_the_buffer() {
    let mut d = display().fail_lock(0);
    let shown = show_solid_color_frame(
        &mut d,
        DisplayTarget::Primary,
        PixelFormat::Rgbx8888,
        Rgb8::new(1, 2, 3),
    );
    assert!(matches!(shown, Err(BootAnimError::Buffer(_))));
    assert_eq!(d.presented().len(), d.dequeue_count(DisplayTarget::Primary));
    assert!(d.presented()[0].buffer.data().iter().all(|&b| b == 0));
}

#[test]
fn unlock_failure_still_returns_the_buffer() {
    let mut d = display().fail_unlock(0);
    let shown = show_solid_color_frame(
        &mut d,
        DisplayTarget::Primary,
        PixelFormat::Rgbx8888,
        Rgb8::BLACK,
    );
    assert!(shown.is_err());
    assert_eq!(d.presented().len(), 1);
    assert!(!d.presented()[0].buffer.is_locked());
}
