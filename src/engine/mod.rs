//! Playback: the frame scheduler, the fallback frame, the engine state machine and the
//! start/stop controller.
//!
//! One worker thread owns the engine for the whole run. The controller only shares a
//! [`cancel::CancellationToken`] with it and joins it on stop.

/// Cooperative cancellation.
pub mod cancel;
/// Start/stop controller that owns the worker thread.
pub mod control;
/// Single solid frame shown instead of the animation.
pub mod fallback;
/// Load, bring-up, playback and degradation.
pub mod runner;
/// Lock-step frame loop.
pub mod scheduler;
