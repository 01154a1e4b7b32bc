use super::*;

fn display() -> InMemoryDisplay {
    InMemoryDisplay::new(DisplaySpec::new(
        BufferGeometry::packed(2, 1),
        crate::pixel::format::hal::RGBX_8888,
    ))
}

fn present(d: &mut InMemoryDisplay, target: DisplayTarget) -> BootAnimResult<()> {
    let mut buf = d
        .dequeue_buffer(target)
        .ok_or_else(|| BootAnimError::buffer("no buffer"))?;
    let region = Region::full(crate::display::provider::GraphicBuffer::geometry(&buf));
    d.lock(&mut buf, BufferUsage::ANIMATION, region)?.fill(7);
    d.unlock(&mut buf)?;
    d.queue_buffer(target, buf)
}

#[test]
fn records_presentations_in_order() {
    let ext = DisplaySpec::new(BufferGeometry::packed(1, 1), crate::pixel::format::hal::RGB_565);
    let mut d = display().with_external(ext);
    assert!(d.is_external_enabled());
    assert_eq!(d.native_format(DisplayTarget::External), 4);

    present(&mut d, DisplayTarget::Primary).unwrap();
    present(&mut d, DisplayTarget::External).unwrap();
    present(&mut d, DisplayTarget::Primary).unwrap();

    let seq: Vec<_> = d.presented().iter().map(|p| (p.sequence, p.target)).collect();
    assert_eq!(
        seq,
        [
            (0, DisplayTarget::Primary),
            (1, DisplayTarget::External),
            (2, DisplayTarget::Primary)
        ]
    );
    assert_eq!(d.presented_on(DisplayTarget::Primary).count(), 2);
    assert_eq!(d.presented()[1].buffer.data(), &[7, 7]);
}

#[test]
fn external_is_absent_by_default() {
    let mut d = display();
    assert!(!d.is_external_enabled());
    assert!(d.dequeue_buffer(DisplayTarget::External).is_none());
}

#[test]
fn injected_failures_hit_only_their_call() {
    let mut d = display().fail_dequeue(DisplayTarget::Primary, 1).fail_lock(1);
    assert!(present(&mut d, DisplayTarget::Primary).is_ok());
    assert!(present(&mut d, DisplayTarget::Primary).is_err());
    assert!(present(&mut d, DisplayTarget::Primary).is_err());
    assert!(present(&mut d, DisplayTarget::Primary).is_ok());
    assert_eq!(d.dequeue_count(DisplayTarget::Primary), 4);
    assert_eq!(d.presented().len(), 2);
}

#[test]
fn injected_unlock_failure_releases_the_lock() {
    let mut d = display().fail_unlock(0);
    let mut buf = d.dequeue_buffer(DisplayTarget::Primary).unwrap();
    let region = Region::full(BufferGeometry::packed(2, 1));
    d.lock(&mut buf, BufferUsage::ANIMATION, region).unwrap();
    assert!(d.unlock(&mut buf).is_err());
    assert!(!buf.is_locked());
    assert!(d.queue_buffer(DisplayTarget::Primary, buf).is_ok());
}

#[test]
fn queueing_a_locked_buffer_is_rejected() {
    let mut d = display();
    let mut buf = d.dequeue_buffer(DisplayTarget::Primary).unwrap();
    let region = Region::full(BufferGeometry::packed(2, 1));
    d.lock(&mut buf, BufferUsage::ANIMATION, region).unwrap();
    assert!(d.queue_buffer(DisplayTarget::Primary, buf).is_err());
}

#[test]
fn cancels_after_presentation_count() {
    let token = CancellationToken::new();
    let mut d = display().cancel_after(2, token.clone());
    present(&mut d, DisplayTarget::Primary).unwrap();
    assert!(!token.is_cancelled());
    present(&mut d, DisplayTarget::Primary).unwrap();
    assert!(token.is_cancelled());
}

#[test]
fn hooks_are_recorded() {
    let mut d = display().fail_all_dequeues();
    assert!(d.dequeue_buffer(DisplayTarget::Primary).is_none());
    d.set_vsync_always_enabled(true);
    d.set_vsync_always_enabled(false);
    d.notify_animation_stopped();
    assert_eq!(d.vsync_history(), &[true, false]);
    assert_eq!(d.stop_notifications(), 1);
}
