//! Placing decoded frames into display buffers.

/// Background fill plus centered frame copy.
pub mod composite;
