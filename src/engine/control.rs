use std::thread::JoinHandle;

use crate::display::provider::DisplayProvider;
use crate::engine::cancel::CancellationToken;
use crate::engine::runner::{BootAnimationEngine, EngineReport};
use crate::foundation::error::{BootAnimError, BootAnimResult};

type Worker<P> = JoinHandle<(BootAnimationEngine<P>, EngineReport)>;

enum ControlState<P: DisplayProvider> {
    Idle(Box<BootAnimationEngine<P>>),
    Running {
        cancel: CancellationToken,
        worker: Worker<P>,
    },
    /// The worker could not be spawned or panicked; the engine is gone.
    Lost,
}

/// Start/stop surface of the boot animation.
///
/// `start` spawns one worker thread that owns the engine for the whole run; `stop` cancels it,
/// joins it and takes the engine back.
pub struct BootAnimation<P: DisplayProvider + Send + 'static> {
    state: ControlState<P>,
    last_report: Option<EngineReport>,
}

impl<P: DisplayProvider + Send + 'static> BootAnimation<P> {
    /// Controller holding `engine`, not yet started.
    pub fn new(engine: BootAnimationEngine<P>) -> Self {
        Self {
            state: ControlState::Idle(Box::new(engine)),
            last_report: None,
        }
    }

    /// Whether a worker thread is alive.
    pub fn is_running(&self) -> bool {
        matches!(self.state, ControlState::Running { .. })
    }

    /// Begin playback on a worker thread. Returns `false` when already running.
    pub fn start(&mut self) -> BootAnimResult<bool> {
        match std::mem::replace(&mut self.state, ControlState::Lost) {
            ControlState::Idle(mut engine) => {
                engine.provider_mut().set_vsync_always_enabled(true);
                let cancel = engine.rearm_cancellation();
                let worker = std::thread::Builder::new()
                    .name("bootanim".to_string())
                    .spawn(move || {
                        let report = engine.run();
                        (*engine, report)
                    })?;
                tracing::info!("boot animation started");
                self.state = ControlState::Running { cancel, worker };
                Ok(true)
            }
            running @ ControlState::Running { .. } => {
                self.state = running;
                Ok(false)
            }
            ControlState::Lost => Err(BootAnimError::Other(anyhow::anyhow!(
                "boot animation engine was lost by a previous run"
            ))),
        }
    }

    /// Cancel playback, wait for the worker and notify the provider.
    ///
    /// Returns `None` when nothing was running.
    pub fn stop(&mut self) -> BootAnimResult<Option<EngineReport>> {
        if let ControlState::Running { cancel, .. } = &self.state {
            cancel.cancel();
        }
        self.join()
    }

    /// Wait for the animation to end on its own, then notify the provider.
    ///
    /// An animation with an infinite segment only ends through [`Self::stop`].
    pub fn wait(&mut self) -> BootAnimResult<Option<EngineReport>> {
        self.join()
    }

    /// Report of the last finished run.
    pub fn last_report(&self) -> Option<&EngineReport> {
        self.last_report.as_ref()
    }

    /// Engine, while no run is in progress.
    pub fn engine(&self) -> Option<&BootAnimationEngine<P>> {
        match &self.state {
            ControlState::Idle(engine) => Some(engine.as_ref()),
            _ => None,
        }
    }

    fn join(&mut self) -> BootAnimResult<Option<EngineReport>> {
        match std::mem::replace(&mut self.state, ControlState::Lost) {
            ControlState::Running { worker, .. } => {
                let (mut engine, report) = worker.join().map_err(|_| {
                    BootAnimError::Other(anyhow::anyhow!("boot animation worker panicked"))
                })?;
                engine.provider_mut().set_vsync_always_enabled(false);
                engine.provider_mut().notify_animation_stopped();
                tracing::info!(state = ?report.state, "boot animation stopped");
                self.state = ControlState::Idle(Box::new(engine));
                self.last_report = Some(report.clone());
                Ok(Some(report))
            }
            other => {
                self.state = other;
                Ok(None)
            }
        }
    }
}

impl<P: DisplayProvider + Send + 'static> Drop for BootAnimation<P> {
    fn drop(&mut self) {
        if self.is_running()
            && let Err(err) = self.stop()
        {
            tracing::warn!(error = %err, "failed to stop boot animation");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/control.rs"]
mod tests;
