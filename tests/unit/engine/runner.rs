use std::path::{Path, PathBuf};

use super::*;
use crate::display::backlight::RecordingBacklight;
use crate::display::memory::{DisplaySpec, InMemoryDisplay};
use crate::pixel::format::hal;
use crate::render::composite::BufferGeometry;
use crate::test_support::{png_rgb, write_archive};

const SCRIPT: &str = "2 2 1000\np 1 0 a\n";

fn two_frames() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("a/0.png", png_rgb(2, 2, [255, 255, 255])),
        ("a/1.png", png_rgb(2, 2, [255, 0, 0])),
    ]
}

fn spec() -> DisplaySpec {
    DisplaySpec::new(BufferGeometry::packed(2, 2), hal::RGBX_8888)
}

fn config(primary: PathBuf, external: PathBuf) -> EngineConfig {
    EngineConfig {
        primary_archive: primary,
        external_archive: external,
        external_settle_ms: 0,
        ..EngineConfig::default()
    }
}

fn engine(
    dir: &Path,
    display: InMemoryDisplay,
    external: PathBuf,
) -> (BootAnimationEngine<InMemoryDisplay>, RecordingBacklight) {
    let primary = write_archive(dir, "primary.zip", SCRIPT, &two_frames());
    let backlight = RecordingBacklight::new();
    let engine = BootAnimationEngine::new(
        config(primary, external),
        display,
        Box::new(backlight.clone()),
    );
    (engine, backlight)
}

fn is_black_rgbx(p: &crate::display::memory::Presentation) -> bool {
    p.buffer.data() == [0u8, 0, 0, 0xFF].repeat(4)
}

#[test]
fn primary_only_run_completes() {
    let dir = tempfile::tempdir().unwrap();
    let (mut engine, backlight) =
        engine(dir.path(), InMemoryDisplay::new(spec()), dir.path().join("none.zip"));
    let report = engine.run();

    assert_eq!(report.state, EngineState::Completed);
    assert_eq!(engine.state(), EngineState::Completed);
    assert_eq!(report.animated, [DisplayTarget::Primary]);
    assert!(report.fallback.is_empty());
    assert_eq!(report.stats.frames_drawn, 2);
    assert_eq!(engine.provider().presented().len(), 2);
    assert_eq!(backlight.history(), [(DisplayTarget::Primary, 255)]);
}

#[test]
fn missing_primary_archive_shows_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let backlight = RecordingBacklight::new();
    let mut engine = BootAnimationEngine::new(
        config(dir.path().join("missing.zip"), dir.path().join("none.zip")),
        InMemoryDisplay::new(spec()).with_external(spec()),
        Box::new(backlight.clone()),
    );
    let report = engine.run();

    assert_eq!(report.state, EngineState::Degraded);
    assert_eq!(
        report.fallback,
        [DisplayTarget::Primary, DisplayTarget::External]
    );
    assert!(report.animated.is_empty());
    let shown = engine.provider().presented();
    assert_eq!(shown.len(), 2);
    assert!(shown.iter().all(is_black_rgbx));
    assert_eq!(
        backlight.history(),
        [(DisplayTarget::Primary, 255), (DisplayTarget::External, 255)]
    );
}

#[test]
fn compatible_external_is_cleared_then_played_in_lock_step() {
    let dir = tempfile::tempdir().unwrap();
    let external = write_archive(dir.path(), "external.zip", SCRIPT, &two_frames());
    let display = InMemoryDisplay::new(spec()).with_external(spec());
    let (mut engine, backlight) = engine(dir.path(), display, external);
    let report = engine.run();

    assert_eq!(report.state, EngineState::Completed);
    assert_eq!(
        report.animated,
        [DisplayTarget::Primary, DisplayTarget::External]
    );
    let shown = engine.provider().presented();
    assert_eq!(shown.len(), 5);
    assert_eq!(shown[0].target, DisplayTarget::External);
    assert!(is_black_rgbx(&shown[0]));
    assert_eq!(engine.provider().presented_on(DisplayTarget::External).count(), 3);
    assert_eq!(
        backlight.history(),
        [(DisplayTarget::External, 255), (DisplayTarget::Primary, 255)]
    );
}

#[test]
fn incompatible_external_falls_back_alone() {
    let dir = tempfile::tempdir().unwrap();
    let one_frame = [("a/0.png", png_rgb(2, 2, [0, 0, 255]))];
    let external = write_archive(dir.path(), "external.zip", SCRIPT, &one_frame);
    let display = InMemoryDisplay::new(spec()).with_external(spec());
    let (mut engine, _) = engine(dir.path(), display, external);
    let report = engine.run();

    assert_eq!(report.state, EngineState::Degraded);
    assert_eq!(report.animated, [DisplayTarget::Primary]);
    assert_eq!(report.fallback, [DisplayTarget::External]);
    let ext: Vec<_> = engine
        .provider()
        .presented_on(DisplayTarget::External)
        .collect();
    assert_eq!(ext.len(), 1);
    assert!(is_black_rgbx(ext[0]));
    assert_eq!(engine.provider().presented_on(DisplayTarget::Primary).count(), 2);
}

#[test]
fn missing_external_archive_falls_back_alone() {
    let dir = tempfile::tempdir().unwrap();
    let display = InMemoryDisplay::new(spec()).with_external(spec());
    let (mut engine, _) = engine(dir.path(), display, dir.path().join("none.zip"));
    let report = engine.run();

    assert_eq!(report.fallback, [DisplayTarget::External]);
    assert_eq!(report.stats.frames_drawn, 2);
}

#[test]
fn nothing_drawn_ends_with_fallback_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let display = InMemoryDisplay::new(spec())
        .fail_dequeue(DisplayTarget::Primary, 0)
        .fail_dequeue(DisplayTarget::Primary, 1);
    let (mut engine, _) = engine(dir.path(), display, dir.path().join("none.zip"));
    let report = engine.run();

    assert_eq!(report.state, EngineState::Degraded);
    assert_eq!(report.stats.frames_drawn, 0);
    assert_eq!(report.stats.buffer_failures, 2);
    assert_eq!(report.fallback, [DisplayTarget::Primary]);
    assert!(report.animated.is_empty());
    // The third dequeue is the fallback frame, which succeeds.
    let shown = engine.provider().presented();
    assert_eq!(shown.len(), 1);
    assert!(is_black_rgbx(&shown[0]));
}

#[test]
fn one_drawn_frame_avoids_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let display = InMemoryDisplay::new(spec()).fail_dequeue(DisplayTarget::Primary, 0);
    let (mut engine, _) = engine(dir.path(), display, dir.path().join("none.zip"));
    let report = engine.run();

    assert_eq!(report.state, EngineState::Completed);
    assert_eq!(report.stats.frames_drawn, 1);
    assert_eq!(report.stats.buffer_failures, 1);
}

#[test]
fn cancelled_token_stops_before_first_pass() {
    let dir = tempfile::tempdir().unwrap();
    let (mut engine, _) =
        engine(dir.path(), InMemoryDisplay::new(spec()), dir.path().join("none.zip"));
    engine.cancellation_token().cancel();
    let report = engine.run();
    assert_eq!(report.stats.passes, 0);
    assert_eq!(report.fallback, [DisplayTarget::Primary]);
}
