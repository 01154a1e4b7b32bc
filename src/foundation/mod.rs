//! Shared primitives: core value types, the error taxonomy and small math helpers.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
