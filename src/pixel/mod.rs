//! Target pixel formats.
//!
//! Every display reports a native format; the matching [`format::PixelFormat`] is selected once
//! per display and then owns the row transform used by the decoder, the packed fill value used
//! by composition, and the reverse conversion used when frames are written back out as PNG.

/// Closed set of target formats and their per-pixel transforms.
pub mod format;
