use std::time::Duration;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::display::backlight::Backlight;
use crate::display::provider::DisplayProvider;
use crate::engine::cancel::CancellationToken;
use crate::engine::fallback::show_solid_color_frame;
use crate::engine::scheduler::{DisplayPipeline, PlaybackStats, play};
use crate::foundation::core::{DisplayTarget, Rgb8};
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::pixel::format::PixelFormat;
use crate::script::descriptor::{AnimationDescriptor, compatible};

/// Lifecycle of one engine run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Reading archives and checking compatibility.
    Loading,
    /// Scheduler running.
    Playing,
    /// Every active display was animated.
    Completed,
    /// At least one display got the fallback frame instead of the animation.
    Degraded,
}

/// Outcome of [`BootAnimationEngine::run`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    /// `Completed` or `Degraded`.
    pub state: EngineState,
    /// Counters from the scheduler; zero when nothing was animated.
    pub stats: PlaybackStats,
    /// Displays that were driven by the scheduler.
    pub animated: Vec<DisplayTarget>,
    /// Displays that were shown the fallback frame.
    pub fallback: Vec<DisplayTarget>,
}

/// Boot animation engine: loads the descriptors, brings up the panels and plays.
///
/// Failures never escape [`Self::run`]; they are logged and turn into fallback frames.
pub struct BootAnimationEngine<P: DisplayProvider> {
    config: EngineConfig,
    provider: P,
    backlight: Box<dyn Backlight + Send>,
    cancel: CancellationToken,
    state: EngineState,
}

impl<P: DisplayProvider> std::fmt::Debug for BootAnimationEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootAnimationEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<P: DisplayProvider> BootAnimationEngine<P> {
    /// Engine driving `provider`, writing brightness through `backlight`.
    pub fn new(config: EngineConfig, provider: P, backlight: Box<dyn Backlight + Send>) -> Self {
        Self {
            config,
            provider,
            backlight,
            cancel: CancellationToken::new(),
            state: EngineState::Loading,
        }
    }

    /// Use `token` instead of a private one, e.g. to share it with a provider.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the current or next run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replace a token that has already fired, so a stopped engine can run again.
    pub(crate) fn rearm_cancellation(&mut self) -> CancellationToken {
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        self.cancel.clone()
    }

    /// Settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The display provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Mutable access to the display provider.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Give the display provider back.
    pub fn into_provider(self) -> P {
        self.provider
    }

    /// State reached by the last run.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Load, bring up and play until the animation ends or is cancelled.
    #[tracing::instrument(skip_all, fields(primary = %self.config.primary_archive.display()))]
    pub fn run(&mut self) -> EngineReport {
        self.transition(EngineState::Loading);
        let mut fallback = Vec::new();

        let native = |target| PixelFormat::from_hal(self.provider.native_format(target));
        let primary_format = native(DisplayTarget::Primary);
        let external_format = self
            .provider
            .is_external_enabled()
            .then(|| native(DisplayTarget::External));

        let defaults = self.config.defaults;
        let primary = match AnimationDescriptor::load(&self.config.primary_archive, &defaults) {
            Ok(desc) => desc,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load boot animation");
                self.set_backlight(100, DisplayTarget::Primary);
                self.show_fallback(DisplayTarget::Primary, primary_format, &mut fallback);
                if let Some(format) = external_format {
                    self.show_fallback(DisplayTarget::External, format, &mut fallback);
                    self.set_backlight(100, DisplayTarget::External);
                }
                return self.finish(PlaybackStats::default(), Vec::new(), fallback);
            }
        };
        tracing::info!(
            width = primary.size().width,
            height = primary.size().height,
            fps = primary.fps().get(),
            segments = primary.segments().len(),
            format = %primary_format,
            "loaded boot animation"
        );

        let mut pipelines = vec![DisplayPipeline {
            target: DisplayTarget::Primary,
            format: primary_format,
            descriptor: primary,
        }];

        if let Some(format) = external_format {
            match self.load_external(&pipelines[0].descriptor) {
                Ok(descriptor) => {
                    self.bring_up_external(format);
                    pipelines.push(DisplayPipeline {
                        target: DisplayTarget::External,
                        format,
                        descriptor,
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "external display falls back");
                    self.show_fallback(DisplayTarget::External, format, &mut fallback);
                    self.set_backlight(100, DisplayTarget::External);
                }
            }
        }

        self.set_backlight(100, DisplayTarget::Primary);
        self.transition(EngineState::Playing);
        let stats = play(&mut self.provider, &pipelines, &self.cancel);
        tracing::info!(?stats, "playback finished");

        let mut animated: Vec<DisplayTarget> = pipelines.iter().map(|p| p.target).collect();
        if stats.frames_drawn == 0 {
            tracing::warn!("no frame was drawn, falling back");
            for pipe in &pipelines {
                self.show_fallback(pipe.target, pipe.format, &mut fallback);
            }
            animated.clear();
        }
        self.finish(stats, animated, fallback)
    }

    fn load_external(&self, primary: &AnimationDescriptor) -> BootAnimResult<AnimationDescriptor> {
        let path = &self.config.external_archive;
        let external = AnimationDescriptor::load(path, &self.config.defaults)?;
        if !compatible(primary, &external) {
            return Err(BootAnimError::incompatible(format!(
                "{} does not match the primary animation",
                path.display()
            )));
        }
        Ok(external)
    }

    /// Clear panel noise, let it settle, then light it.
    fn bring_up_external(&mut self, format: PixelFormat) {
        let cleared =
            show_solid_color_frame(&mut self.provider, DisplayTarget::External, format, Rgb8::BLACK);
        if let Err(err) = cleared {
            tracing::warn!(error = %err, "failed to clear external display");
        }
        std::thread::sleep(Duration::from_millis(self.config.external_settle_ms));
        self.set_backlight(100, DisplayTarget::External);
    }

    fn show_fallback(
        &mut self,
        target: DisplayTarget,
        format: PixelFormat,
        shown: &mut Vec<DisplayTarget>,
    ) {
        if let Err(err) = show_solid_color_frame(&mut self.provider, target, format, Rgb8::BLACK) {
            tracing::warn!(display = %target, error = %err, "fallback frame failed");
        }
        if !shown.contains(&target) {
            shown.push(target);
        }
    }

    fn set_backlight(&mut self, percent: u32, channel: DisplayTarget) {
        if let Err(err) = self.backlight.set_backlight(percent, channel) {
            tracing::warn!(%channel, error = %err, "failed to set backlight");
        }
    }

    fn transition(&mut self, next: EngineState) {
        tracing::debug!(from = ?self.state, to = ?next, "engine state");
        self.state = next;
    }

    fn finish(
        &mut self,
        stats: PlaybackStats,
        animated: Vec<DisplayTarget>,
        fallback: Vec<DisplayTarget>,
    ) -> EngineReport {
        let state = if fallback.is_empty() {
            EngineState::Completed
        } else {
            EngineState::Degraded
        };
        self.transition(state);
        EngineReport {
            state,
            stats,
            animated,
            fallback,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/runner.rs"]
mod tests;
