use crate::display::provider::{BufferUsage, DisplayProvider, GraphicBuffer, Region};
use crate::engine::scheduler::give_back;
use crate::foundation::core::{DisplayTarget, Rgb8};
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::pixel::format::PixelFormat;
use crate::render::composite::fill_solid;

/// Present one frame of solid `color` on `target`, covering `height * stride` pixels.
pub fn show_solid_color_frame<P: DisplayProvider>(
    provider: &mut P,
    target: DisplayTarget,
    format: PixelFormat,
    color: Rgb8,
) -> BootAnimResult<()> {
    let mut buffer = provider
        .dequeue_buffer(target)
        .ok_or_else(|| BootAnimError::buffer(format!("no buffer for {target} display")))?;
    let geom = buffer.geometry();
    let filled = provider
        .lock(&mut buffer, BufferUsage::ANIMATION, Region::full(geom))
        .map(|dst| fill_solid(dst, geom, format, color));
    if let Err(err) = filled.and_then(|()| provider.unlock(&mut buffer)) {
        return Err(give_back(provider, target, buffer, err));
    }
    provider.queue_buffer(target, buffer)?;
    tracing::info!(display = %target, ?color, "displayed solid color frame");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/engine/fallback.rs"]
mod tests;
