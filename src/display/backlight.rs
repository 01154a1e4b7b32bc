use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::config::BacklightConfig;
use crate::foundation::core::DisplayTarget;
use crate::foundation::error::BootAnimResult;

/// Map a 0..=100 percentage to the 8-bit device range; `None` above 100.
pub fn brightness_value(percent: u32) -> Option<u32> {
    (percent <= 100).then(|| percent * 255 / 100)
}

/// Panel backlight control. `External` addresses the secondary channel.
pub trait Backlight {
    /// Set `channel` to `percent`. Values above 100 are ignored.
    fn set_backlight(&mut self, percent: u32, channel: DisplayTarget) -> BootAnimResult<()>;
}

/// Backlight driven through sysfs LED brightness nodes.
#[derive(Clone, Debug)]
pub struct SysfsBacklight {
    config: BacklightConfig,
}

impl SysfsBacklight {
    /// Write to the nodes named in `config`.
    pub fn new(config: BacklightConfig) -> Self {
        Self { config }
    }
}

impl Backlight for SysfsBacklight {
    fn set_backlight(&mut self, percent: u32, channel: DisplayTarget) -> BootAnimResult<()> {
        let Some(value) = brightness_value(percent) else {
            tracing::debug!(percent, "ignoring backlight level above 100%");
            return Ok(());
        };
        let path = match channel {
            DisplayTarget::Primary => &self.config.primary_path,
            DisplayTarget::External => &self.config.secondary_path,
        };
        // The node is owned by the kernel; never create it.
        let mut node = std::fs::OpenOptions::new()
            .write(true)
            .open(path)
            .with_context(|| format!("open backlight node {}", path.display()))?;
        write!(node, "{value}").with_context(|| format!("write {}", path.display()))?;
        tracing::debug!(%channel, value, path = %path.display(), "backlight set");
        Ok(())
    }
}

/// Backlight that only remembers what was requested. Clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct RecordingBacklight {
    log: Arc<Mutex<Vec<(DisplayTarget, u32)>>>,
}

impl RecordingBacklight {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every accepted `(channel, device value)` write, in order.
    pub fn history(&self) -> Vec<(DisplayTarget, u32)> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl Backlight for RecordingBacklight {
    fn set_backlight(&mut self, percent: u32, channel: DisplayTarget) -> BootAnimResult<()> {
        let Some(value) = brightness_value(percent) else {
            return Ok(());
        };
        tracing::debug!(%channel, value, "backlight set");
        if let Ok(mut log) = self.log.lock() {
            log.push((channel, value));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/backlight.rs"]
mod tests;
