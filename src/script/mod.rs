//! `desc.txt` animation script: line grammar and descriptor resolution.
//!
//! The script is line-oriented:
//!
//! ```text
//! <width> <height> <fps>          header, at most once, before any segment line
//! p <count> <pause> <path>        one segment; count 0 repeats forever
//! ```
//!
//! Each segment plays every stored member under `<path>/` in name order, `count` times, pausing
//! `pause` frame intervals after each pass.

/// Resolved animation descriptors and the lock-step compatibility check.
pub mod descriptor;
/// Line grammar of the script text.
pub mod parse;

/// Fixed archive member name of the animation script.
pub const SCRIPT_NAME: &str = "desc.txt";

/// Longest accepted segment path and member name, in bytes.
pub const MAX_PATH_LEN: usize = 255;
