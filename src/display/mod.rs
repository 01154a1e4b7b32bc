//! Display provider contract and the providers shipped with the crate.

/// Backlight control nodes.
pub mod backlight;
/// Software buffers and a recording provider.
pub mod memory;
/// Provider that writes every presented buffer to disk as PNG.
pub mod png_sequence;
/// The provider trait and buffer types it exchanges.
pub mod provider;
