use std::time::Duration;

use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Frames-per-second of an animation descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Fps(u32);

impl Fps {
    /// Create a validated, non-zero FPS value.
    pub fn new(fps: u32) -> BootAnimResult<Self> {
        if fps == 0 {
            return Err(BootAnimError::config("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Raw frames-per-second value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Wall-clock budget of one frame, truncated to whole microseconds.
    pub fn frame_interval(self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.0))
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical display an animation pipeline drives.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTarget {
    /// Built-in panel; its descriptor is the timing authority.
    Primary,
    /// Optional external panel driven in lock-step with the primary.
    External,
}

impl DisplayTarget {
    /// Both targets in presentation order.
    pub const ALL: [DisplayTarget; 2] = [DisplayTarget::Primary, DisplayTarget::External];

    /// Stable lowercase name used in logs and output paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for DisplayTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Straight 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Opaque black.
    pub const BLACK: Rgb8 = Rgb8 { r: 0, g: 0, b: 0 };

    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Pixel dimensions of a frame or descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Construct a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
