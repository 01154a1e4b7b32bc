use std::time::Instant;

use serde::Serialize;

use crate::decode::frame::{DecodedFrame, decode_frame};
use crate::display::provider::{BufferUsage, DisplayProvider, GraphicBuffer, Region};
use crate::engine::cancel::CancellationToken;
use crate::foundation::core::DisplayTarget;
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::pixel::format::PixelFormat;
use crate::render::composite::{Placement, composite};
use crate::script::descriptor::AnimationDescriptor;
use crate::script::parse::Repeat;

/// One display being animated: where frames go, in which format, from which descriptor.
#[derive(Clone, Debug)]
pub struct DisplayPipeline {
    /// Display the frames go to.
    pub target: DisplayTarget,
    /// Pixel format frames are decoded into.
    pub format: PixelFormat,
    /// Animation played on the display.
    pub descriptor: AnimationDescriptor,
}

/// Counters collected by one playback run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackStats {
    /// Repeat passes started, over all segments.
    pub passes: u64,
    /// Frame slots scheduled on the timing display.
    pub frames_scheduled: u64,
    /// Buffers successfully composited and queued, over all displays.
    pub frames_drawn: u64,
    /// Successful frame decodes.
    pub decodes: u64,
    /// Frame decodes that failed.
    pub decode_failures: u64,
    /// Presentations that failed to get, lock or queue a buffer.
    pub buffer_failures: u64,
    /// Frame slots whose work took longer than the frame interval.
    pub budget_overruns: u64,
}

/// Decoded frames of the segment in flight, one slot per frame index and display.
struct FrameCache {
    slots: Vec<Vec<Option<DecodedFrame>>>,
}

impl FrameCache {
    fn for_segment(pipelines: &[DisplayPipeline], segment: usize) -> Self {
        let slots = pipelines
            .iter()
            .map(|p| {
                let frames = p.descriptor.segments().get(segment).map_or(0, |s| s.frames.len());
                vec![None; frames]
            })
            .collect();
        Self { slots }
    }

    fn slot(&mut self, pipeline: usize, frame: usize) -> Option<&mut Option<DecodedFrame>> {
        self.slots.get_mut(pipeline)?.get_mut(frame)
    }
}

/// Play the segments of `pipelines[0]` in lock-step on every pipeline.
///
/// The first pipeline is the timing authority: its segment structure and frame rate drive the
/// loop. Other pipelines present the frame at the same segment and index; a missing counterpart
/// is skipped for that slot. Decode and buffer failures are counted and skipped. Cancellation is
/// checked before every repeat pass.
pub fn play<P: DisplayProvider>(
    provider: &mut P,
    pipelines: &[DisplayPipeline],
    cancel: &CancellationToken,
) -> PlaybackStats {
    let mut stats = PlaybackStats::default();
    let Some(timing) = pipelines.first() else {
        return stats;
    };
    let interval = timing.descriptor.fps().frame_interval();

    'segments: for (si, segment) in timing.descriptor.segments().iter().enumerate() {
        let mut cache = FrameCache::for_segment(pipelines, si);
        let mut completed = 0u32;

        while segment.repeat.allows_pass(completed) {
            if cancel.is_cancelled() {
                tracing::info!(segment = si, pass = completed, "playback cancelled");
                break 'segments;
            }
            stats.passes += 1;
            let last_pass = segment.repeat.is_last_pass(completed + 1);

            for fi in 0..segment.frames.len() {
                let started = Instant::now();
                for (pi, pipe) in pipelines.iter().enumerate() {
                    let Some(slot) = cache.slot(pi, fi) else {
                        tracing::debug!(
                            display = %pipe.target,
                            segment = si,
                            frame = fi,
                            "no counterpart frame"
                        );
                        continue;
                    };
                    present_slot(provider, pipe, si, fi, slot, &mut stats);
                    if last_pass {
                        *slot = None;
                    }
                }
                stats.frames_scheduled += 1;

                let elapsed = started.elapsed();
                match interval.checked_sub(elapsed) {
                    Some(rest) => std::thread::sleep(rest),
                    None => {
                        stats.budget_overruns += 1;
                        tracing::warn!(
                            "frame delay is {} us but decoding took {} us",
                            interval.as_micros(),
                            elapsed.as_micros()
                        );
                    }
                }
            }

            completed = completed.saturating_add(1);
            if segment.pause_frames > 0 {
                std::thread::sleep(interval.saturating_mul(segment.pause_frames));
            } else if segment.frames.is_empty() && segment.repeat == Repeat::Infinite {
                // Nothing to present; keep the loop from spinning until cancelled.
                std::thread::sleep(interval);
            }
        }
    }

    stats
}

fn present_slot<P: DisplayProvider>(
    provider: &mut P,
    pipe: &DisplayPipeline,
    segment: usize,
    frame: usize,
    slot: &mut Option<DecodedFrame>,
    stats: &mut PlaybackStats,
) {
    if slot.is_none() {
        let Some(frame_ref) = pipe
            .descriptor
            .segments()
            .get(segment)
            .and_then(|s| s.frames.get(frame))
        else {
            return;
        };
        match decode_frame(pipe.descriptor.frame_bytes(frame_ref), pipe.format) {
            Ok(decoded) => {
                stats.decodes += 1;
                *slot = Some(decoded);
            }
            Err(err) => {
                stats.decode_failures += 1;
                tracing::warn!(
                    display = %pipe.target,
                    segment,
                    frame,
                    name = frame_ref.name(),
                    error = %err,
                    "failed to decode frame"
                );
                return;
            }
        }
    }
    let Some(decoded) = slot.as_ref() else {
        return;
    };

    match present_frame(provider, pipe.target, pipe.format, decoded) {
        Ok(placement) => {
            stats.frames_drawn += 1;
            if !placement.drew_image() {
                tracing::debug!(display = %pipe.target, segment, frame, "frame larger than buffer");
            }
        }
        Err(err) => {
            stats.buffer_failures += 1;
            tracing::warn!(
                display = %pipe.target,
                segment,
                frame,
                error = %err,
                "failed to present frame"
            );
        }
    }
}

/// Dequeue, lock, composite, unlock and queue one frame.
pub fn present_frame<P: DisplayProvider>(
    provider: &mut P,
    target: DisplayTarget,
    format: PixelFormat,
    frame: &DecodedFrame,
) -> BootAnimResult<Placement> {
    let mut buffer = provider
        .dequeue_buffer(target)
        .ok_or_else(|| BootAnimError::buffer("dequeue returned no buffer"))?;
    let geom = buffer.geometry();
    let drawn = provider
        .lock(&mut buffer, BufferUsage::ANIMATION, Region::full(geom))
        .map(|dst| composite(dst, geom, frame, format));
    let placement = match drawn {
        Ok(placement) => placement,
        Err(err) => return Err(give_back(provider, target, buffer, err)),
    };
    if let Err(err) = provider.unlock(&mut buffer) {
        return Err(give_back(provider, target, buffer, err));
    }
    provider.queue_buffer(target, buffer)?;
    Ok(placement)
}

/// Queue a buffer whose lock or unlock failed so the provider's pool does not shrink.
///
/// Returns `err`; a failure to queue is only logged.
pub(crate) fn give_back<P: DisplayProvider>(
    provider: &mut P,
    target: DisplayTarget,
    buffer: P::Buffer,
    err: BootAnimError,
) -> BootAnimError {
    if let Err(queue_err) = provider.queue_buffer(target, buffer) {
        tracing::warn!(display = %target, error = %queue_err, "failed to return buffer");
    }
    err
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
