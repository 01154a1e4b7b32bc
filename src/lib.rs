//! Boot animation engine.
//!
//! Plays a boot animation archive on a primary display and, when one is connected and its
//! animation matches, an external display in lock-step.
//!
//! # Pipeline overview
//!
//! 1. **Index**: [`ArchiveIndex`] reads the directory of a stored-only ZIP archive.
//! 2. **Describe**: [`AnimationDescriptor`] parses `desc.txt` and resolves every segment to
//!    its sorted frame members.
//! 3. **Decode**: [`decode_frame`] turns one PNG member into the display's [`PixelFormat`].
//! 4. **Present**: [`play`] composites frames into buffers obtained from a [`DisplayProvider`]
//!    at the descriptor's frame rate.
//!
//! [`BootAnimationEngine`] ties these together and degrades to a solid frame when an archive
//! cannot be used; [`BootAnimation`] runs it on a worker thread with start/stop semantics.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod archive;
mod config;
mod decode;
mod display;
mod engine;
mod foundation;
mod pixel;
mod render;
mod script;

pub use archive::index::{ArchiveIndex, DirectoryEntry, PayloadRef};
pub use archive::writer::StoredArchiveWriter;
pub use config::{BacklightConfig, EngineConfig};
pub use decode::background::background_hint;
pub use decode::frame::{DecodedFrame, decode_frame};
pub use display::backlight::{Backlight, RecordingBacklight, SysfsBacklight, brightness_value};
pub use display::memory::{DisplaySpec, InMemoryDisplay, Presentation};
pub use display::png_sequence::PngSequenceDisplay;
pub use display::provider::{BufferUsage, DisplayProvider, GraphicBuffer, Region, SoftwareBuffer};
pub use engine::cancel::CancellationToken;
pub use engine::control::BootAnimation;
pub use engine::fallback::show_solid_color_frame;
pub use engine::runner::{BootAnimationEngine, EngineReport, EngineState};
pub use engine::scheduler::{DisplayPipeline, PlaybackStats, play, present_frame};
pub use foundation::core::{DisplayTarget, Fps, Rgb8, Size};
pub use foundation::error::{BootAnimError, BootAnimResult, ContainerErrorKind};
pub use pixel::format::{PixelFormat, SourceLayout, hal, pack_565};
pub use render::composite::{BufferGeometry, Placement, composite, fill_solid};
pub use script::descriptor::{
    AnimationDescriptor, AnimationSegment, DescriptorDefaults, FrameRef, compatible,
};
pub use script::parse::{Repeat, Script, SegmentSpec, parse_script};
pub use script::{MAX_PATH_LEN, SCRIPT_NAME};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod test_support;
