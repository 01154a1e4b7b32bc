use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::display::memory::DisplaySpec;
use crate::display::provider::{BufferUsage, DisplayProvider, GraphicBuffer, Region, SoftwareBuffer};
use crate::foundation::core::DisplayTarget;
use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Provider that saves every queued buffer as `<out>/<display>/NNNNN.png`.
#[derive(Debug)]
pub struct PngSequenceDisplay {
    out_dir: PathBuf,
    primary: DisplaySpec,
    external: Option<DisplaySpec>,
    written: [usize; 2],
}

impl PngSequenceDisplay {
    /// Create the output directories up front.
    pub fn new(
        out_dir: impl Into<PathBuf>,
        primary: DisplaySpec,
        external: Option<DisplaySpec>,
    ) -> BootAnimResult<Self> {
        let out_dir = out_dir.into();
        for target in DisplayTarget::ALL {
            if target == DisplayTarget::External && external.is_none() {
                continue;
            }
            let dir = out_dir.join(target.as_str());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create output directory {}", dir.display()))?;
        }
        Ok(Self {
            out_dir,
            primary,
            external,
            written: [0; 2],
        })
    }

    /// Root of the per-display output folders.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Frames written for `target` so far.
    pub fn written(&self, target: DisplayTarget) -> usize {
        match target {
            DisplayTarget::Primary => self.written[0],
            DisplayTarget::External => self.written[1],
        }
    }

    fn spec(&self, target: DisplayTarget) -> Option<&DisplaySpec> {
        match target {
            DisplayTarget::Primary => Some(&self.primary),
            DisplayTarget::External => self.external.as_ref(),
        }
    }
}

impl DisplayProvider for PngSequenceDisplay {
    type Buffer = SoftwareBuffer;

    fn native_format(&self, target: DisplayTarget) -> u32 {
        self.spec(target).map_or(self.primary.format_code, |s| s.format_code)
    }

    fn is_external_enabled(&self) -> bool {
        self.external.is_some()
    }

    fn dequeue_buffer(&mut self, target: DisplayTarget) -> Option<SoftwareBuffer> {
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
        let idx = match target {
            DisplayTarget::Primary => 0,
            DisplayTarget::External => 1,
        };
        let path = self
            .out_dir
            .join(target.as_str())
            .join(format!("{:05}.png", self.written[idx]));

        let geom = buffer.geometry();
        let img = image::RgbaImage::from_raw(geom.width, geom.height, buffer.to_rgba8())
            .ok_or_else(|| BootAnimError::buffer("buffer does not match its geometry"))?;
        img.save(&path).with_context(|| format!("write frame {}", path.display()))?;

        self.written[idx] += 1;
        Ok(())
    }

    fn lock<'b>(
        &mut self,
        buffer: &'b mut SoftwareBuffer,
        usage: BufferUsage,
        region: Region,
    ) -> BootAnimResult<&'b mut [u8]> {
        buffer.lock_region(usage, region)
    }

    fn unlock(&mut self, buffer: &mut SoftwareBuffer) -> BootAnimResult<()> {
        buffer.release_lock()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/png_sequence.rs"]
mod tests;
