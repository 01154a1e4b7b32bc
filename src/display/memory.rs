use std::collections::BTreeSet;

use crate::display::provider::{BufferUsage, DisplayProvider, Region, SoftwareBuffer};
use crate::engine::cancel::CancellationToken;
use crate::foundation::core::DisplayTarget;
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::pixel::format::PixelFormat;
use crate::render::composite::BufferGeometry;

/// Shape and native format of one simulated display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySpec {
    /// Buffer shape handed out on dequeue.
    pub geometry: BufferGeometry,
    /// Provider format code reported by `native_format`.
    pub format_code: u32,
}

impl DisplaySpec {
    /// Display of `geometry` reporting `format_code`.
    pub fn new(geometry: BufferGeometry, format_code: u32) -> Self {
        Self {
            geometry,
            format_code,
        }
    }

    pub(crate) fn allocate(&self) -> SoftwareBuffer {
        SoftwareBuffer::new(self.geometry, PixelFormat::from_hal(self.format_code))
    }
}

/// One buffer queued for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Display the buffer was queued on.
    pub target: DisplayTarget,
    /// Position among all presentations on any display.
    pub sequence: usize,
    /// Buffer contents at the time it was queued.
    pub buffer: SoftwareBuffer,
}

/// Provider backed by heap buffers that records everything presented to it.
///
/// Dequeue, lock and unlock failures can be injected by call index, and a cancellation token can be
/// tripped once a number of buffers have been presented.
#[derive(Debug)]
pub struct InMemoryDisplay {
    primary: DisplaySpec,
    external: Option<DisplaySpec>,
    presented: Vec<Presentation>,
    dequeues: [usize; 2],
    locks: usize,
    unlocks: usize,
    failing_dequeues: BTreeSet<(DisplayTarget, usize)>,
    fail_every_dequeue: bool,
    failing_locks: BTreeSet<usize>,
    failing_unlocks: BTreeSet<usize>,
    cancel_after: Option<(usize, CancellationToken)>,
    vsync_history: Vec<bool>,
    stop_notifications: usize,
}

fn slot(target: DisplayTarget) -> usize {
    match target {
        DisplayTarget::Primary => 0,
        DisplayTarget::External => 1,
    }
}

impl InMemoryDisplay {
    /// Primary display only.
    pub fn new(primary: DisplaySpec) -> Self {
        Self {
            primary,
            external: None,
            presented: Vec::new(),
            dequeues: [0; 2],
            locks: 0,
            unlocks: 0,
            failing_dequeues: BTreeSet::new(),
            fail_every_dequeue: false,
            failing_locks: BTreeSet::new(),
            failing_unlocks: BTreeSet::new(),
            cancel_after: None,
            vsync_history: Vec::new(),
            stop_notifications: 0,
        }
    }

    /// Attach an external display.
    pub fn with_external(mut self, external: DisplaySpec) -> Self {
        self.external = Some(external);
        self
    }

    /// Make the `nth` (0-based) dequeue on `target` return no buffer.
    pub fn fail_dequeue(mut self, target: DisplayTarget, nth: usize) -> Self {
        self.failing_dequeues.insert((target, nth));
        self
    }

    /// Make every dequeue return no buffer.
    pub fn fail_all_dequeues(mut self) -> Self {
        self.fail_every_dequeue = true;
        self
    }

    /// Make the `nth` (0-based) lock call fail.
    pub fn fail_lock(mut self, nth: usize) -> Self {
        self.failing_locks.insert(nth);
        self
    }

    /// Make the `nth` (0-based) unlock call report an error. The lock is still released, so the
    /// buffer can be queued afterwards.
    pub fn fail_unlock(mut self, nth: usize) -> Self {
        self.failing_unlocks.insert(nth);
        self
    }

    /// Cancel `token` once `presentations` buffers have been queued.
    pub fn cancel_after(mut self, presentations: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((presentations, token));
        self
    }

    /// Every queued buffer, in order.
    pub fn presented(&self) -> &[Presentation] {
        &self.presented
    }

    /// Presentations on one display, in order.
    pub fn presented_on(&self, target: DisplayTarget) -> impl Iterator<Item = &Presentation> {
        self.presented.iter().filter(move |p| p.target == target)
    }

    /// Dequeue calls made for `target`, failed ones included.
    pub fn dequeue_count(&self, target: DisplayTarget) -> usize {
        self.dequeues[slot(target)]
    }

    /// Arguments of every vsync hook call, in order.
    pub fn vsync_history(&self) -> &[bool] {
        &self.vsync_history
    }

    /// How many times the provider was told the animation stopped.
    pub fn stop_notifications(&self) -> usize {
        self.stop_notifications
    }

    fn spec(&self, target: DisplayTarget) -> Option<&DisplaySpec> {
        match target {
            DisplayTarget::Primary => Some(&self.primary),
            DisplayTarget::External => self.external.as_ref(),
        }
    }
}

impl DisplayProvider for InMemoryDisplay {
    type Buffer = SoftwareBuffer;

    fn native_format(&self, target: DisplayTarget) -> u32 {
        self.spec(target).map_or(self.primary.format_code, |s| s.format_code)
    }

    fn is_external_enabled(&self) -> bool {
        self.external.is_some()
    }

    fn dequeue_buffer(&mut self, target: DisplayTarget) -> Option<SoftwareBuffer> {
        let nth = self.dequeues[slot(target)];
        self.dequeues[slot(target)] += 1;
        if self.fail_every_dequeue || self.failing_dequeues.contains(&(target, nth)) {
            return None;
        }
        self.spec(target).map(DisplaySpec::allocate)
    }

    fn queue_buffer(
        &mut self,
        target: DisplayTarget,
        buffer: SoftwareBuffer,
    ) -> BootAnimResult<()> {
        if buffer.is_locked() {
            return Err(BootAnimError::buffer("queued a buffer that is still locked"));
        }
        self.presented.push(Presentation {
            target,
            sequence: self.presented.len(),
            buffer,
        });
        if let Some((after, token)) = &self.cancel_after
            && self.presented.len() >= *after
        {
            token.cancel();
        }
        Ok(())
    }

    fn lock<'b>(
        &mut self,
        buffer: &'b mut SoftwareBuffer,
        usage: BufferUsage,
        region: Region,
    ) -> BootAnimResult<&'b mut [u8]> {
        let nth = self.locks;
        self.locks += 1;
        if self.failing_locks.contains(&nth) {
            return Err(BootAnimError::buffer(format!("injected lock failure #{nth}")));
        }
        buffer.lock_region(usage, region)
    }

    fn unlock(&mut self, buffer: &mut SoftwareBuffer) -> BootAnimResult<()> {
        let nth = self.unlocks;
        self.unlocks += 1;
        buffer.release_lock()?;
        if self.failing_unlocks.contains(&nth) {
            return Err(BootAnimError::buffer(format!("injected unlock failure #{nth}")));
        }
        Ok(())
    }

    fn set_vsync_always_enabled(&mut self, enabled: bool) {
        self.vsync_history.push(enabled);
    }

    fn notify_animation_stopped(&mut self) {
        self.stop_notifications += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/memory.rs"]
mod tests;
