//! Frame decoding: PNG payload bytes to a display-format pixel buffer.

/// PNG `bKGD` chunk reader.
pub mod background;
/// Payload decode into [`frame::DecodedFrame`].
pub mod frame;
