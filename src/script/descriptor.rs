use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::archive::index::{ArchiveIndex, PayloadRef};
use crate::foundation::core::{Fps, Size};
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::script::parse::{Repeat, parse_script};
use crate::script::{MAX_PATH_LEN, SCRIPT_NAME};

/// Canvas and frame rate assumed when the script has no header line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorDefaults {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
}

impl Default for DescriptorDefaults {
    fn default() -> Self {
        Self {
            width: 320,
            height: 480,
            fps: 12,
        }
    }
}

impl DescriptorDefaults {
    /// Default canvas size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Default frame rate, validated.
    pub fn fps(&self) -> BootAnimResult<Fps> {
        Fps::new(self.fps)
    }
}

/// One frame of a segment: the member name and its payload inside the descriptor's archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRef {
    name: String,
    payload: PayloadRef,
}

impl FrameRef {
    /// Full archive member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload location.
    pub fn payload(&self) -> &PayloadRef {
        &self.payload
    }
}

/// A repeating run of frames taken from one archive directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationSegment {
    /// Repeat budget.
    pub repeat: Repeat,
    /// Frame intervals to wait after each pass.
    pub pause_frames: u32,
    /// Archive directory the frames came from.
    pub path_prefix: String,
    /// Frames in playback order (sorted by member name).
    pub frames: Vec<FrameRef>,
}

/// Fully resolved animation for one display: timing, segments and the archive backing them.
#[derive(Clone, Debug)]
pub struct AnimationDescriptor {
    size: Size,
    fps: Fps,
    segments: Vec<AnimationSegment>,
    archive: ArchiveIndex,
}

impl AnimationDescriptor {
    /// Open the archive at `path` and resolve its script.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path, defaults: &DescriptorDefaults) -> BootAnimResult<Self> {
        let archive = ArchiveIndex::open(path)?;
        Self::from_archive(archive, defaults)
    }

    /// Resolve the script of an already indexed archive.
    pub fn from_archive(
        archive: ArchiveIndex,
        defaults: &DescriptorDefaults,
    ) -> BootAnimResult<Self> {
        let text = {
            let entry = archive
                .find(SCRIPT_NAME)
                .ok_or_else(|| BootAnimError::script(format!("{SCRIPT_NAME} not found")))?;
            let payload = archive.payload_of(entry).ok_or_else(|| {
                BootAnimError::script(format!("{SCRIPT_NAME} payload is out of bounds"))
            })?;
            // Owned copy; the script outlives any borrow of the archive bytes.
            String::from_utf8_lossy(archive.payload_bytes(&payload)).into_owned()
        };

        let script = parse_script(&text, defaults.size(), defaults.fps()?)?;
        if !script.has_header {
            tracing::warn!(
                width = script.size.width,
                height = script.size.height,
                fps = script.fps.get(),
                "{SCRIPT_NAME} has no header line, using defaults"
            );
        }

        let segments = script
            .segments
            .into_iter()
            .map(|spec| AnimationSegment {
                frames: resolve_frames(&archive, &spec.path_prefix),
                repeat: spec.repeat,
                pause_frames: spec.pause_frames,
                path_prefix: spec.path_prefix,
            })
            .collect::<Vec<_>>();

        for (i, seg) in segments.iter().enumerate() {
            tracing::debug!(
                segment = i,
                path = %seg.path_prefix,
                count = seg.repeat.count(),
                pause = seg.pause_frames,
                frames = seg.frames.len(),
                "resolved segment"
            );
        }

        Ok(Self {
            size: script.size,
            fps: script.fps,
            segments,
            archive,
        })
    }

    /// Canvas size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Segments in playback order.
    pub fn segments(&self) -> &[AnimationSegment] {
        &self.segments
    }

    /// Archive backing the frame payloads.
    pub fn archive(&self) -> &ArchiveIndex {
        &self.archive
    }

    /// Compressed bytes of one frame.
    pub fn frame_bytes(&self, frame: &FrameRef) -> &[u8] {
        self.archive.payload_bytes(&frame.payload)
    }

    /// Whether `other` can be driven in lock-step with `self`.
    pub fn compatible(&self, other: &AnimationDescriptor) -> bool {
        compatible(self, other)
    }
}

/// Two descriptors are compatible when frame rates and segment counts match, and every segment
/// pair agrees on repeat budget, pause and frame count.
pub fn compatible(a: &AnimationDescriptor, b: &AnimationDescriptor) -> bool {
    a.fps == b.fps
        && a.segments.len() == b.segments.len()
        && a.segments.iter().zip(&b.segments).all(|(x, y)| {
            x.repeat == y.repeat
                && x.pause_frames == y.pause_frames
                && x.frames.len() == y.frames.len()
        })
}

/// Every non-empty member under `<prefix>/`, sorted by full name.
fn resolve_frames(archive: &ArchiveIndex, prefix: &str) -> Vec<FrameRef> {
    let search = format!("{prefix}/");
    let mut frames = Vec::new();
    for entry in archive.entries() {
        let name = archive.entry_name_bytes(entry);
        if !name.starts_with(search.as_bytes())
            || entry.data_size() == 0
            || name.len() > MAX_PATH_LEN
        {
            continue;
        }

        let name = archive.entry_name(entry).into_owned();
        if !entry.is_stored() {
            tracing::warn!(%name, method = entry.compression(), "frame is not stored uncompressed");
        }
        let Some(payload) = archive.payload_of(entry) else {
            tracing::warn!(%name, "frame payload is out of bounds, skipping");
            continue;
        };
        frames.push(FrameRef { name, payload });
    }

    frames.sort_by(|a, b| a.name.cmp(&b.name));
    frames
}

#[cfg(test)]
#[path = "../../tests/unit/script/descriptor.rs"]
mod tests;
