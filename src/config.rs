use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::script::descriptor::DescriptorDefaults;

/// Paths of the two backlight control nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklightConfig {
    /// Brightness node of the built-in panel.
    pub primary_path: PathBuf,
    /// Brightness node of the external panel.
    pub secondary_path: PathBuf,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            primary_path: PathBuf::from("/sys/class/leds/lcd-backlight/brightness"),
            secondary_path: PathBuf::from("/sys/class/leds/sublcd-backlight/brightness"),
        }
    }
}

/// Engine configuration.
///
/// Every field has a default, so a JSON file only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Archive played on the primary display.
    pub primary_archive: PathBuf,
    /// Archive played on the external display, when one is connected.
    pub external_archive: PathBuf,
    /// Backlight control nodes.
    pub backlight: BacklightConfig,
    /// Delay between clearing the external panel and turning its backlight on.
    pub external_settle_ms: u64,
    /// Canvas and frame rate used when a script has no header line.
    pub defaults: DescriptorDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_archive: PathBuf::from("/system/media/bootanimation.zip"),
            external_archive: PathBuf::from("/system/media/bootanimation_external.zip"),
            backlight: BacklightConfig::default(),
            external_settle_ms: 20,
            defaults: DescriptorDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> BootAnimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| BootAnimError::config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> BootAnimResult<()> {
        if self.defaults.fps == 0 {
            return Err(BootAnimError::config("defaults.fps must be > 0"));
        }
        if self.defaults.width == 0 || self.defaults.height == 0 {
            return Err(BootAnimError::config(
                "defaults.width and defaults.height must be > 0",
            ));
        }
        if self.primary_archive.as_os_str().is_empty() {
            return Err(BootAnimError::config("primary_archive must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
