//! Persistent application configuration.
//!
//! Stored as TOML through `confy` under the `fray` application name. Loading
//! never fails: a missing or unreadable file falls back to defaults.

use std::path::Path;
use std::time::Duration;

use fray_types::{BattleLogSettings, EffectTiming, FeedSettings, OverlaySettings};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const APP_NAME: &str = "fray";

/// Smallest accepted polling period; a zero interval would spin.
const MIN_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedSettings,
    pub timing: EffectTiming,
    pub overlay: OverlaySettings,
    pub battle_log: BattleLogSettings,
}

impl AppConfig {
    /// Polling period, clamped to a sane minimum.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.feed.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn marker_ttl(&self) -> Duration {
        Duration::from_millis(self.timing.marker_ttl_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.timing.flash_ms)
    }
}

/// Load/save helpers, kept off the plain data type.
pub trait AppConfigExt: Sized {
    /// Load from the platform config directory, defaults on failure.
    fn load() -> Self;
    /// Load from an explicit file path, defaults on failure.
    fn load_from(path: &Path) -> Self;
    /// Persist to the platform config directory. Failures are logged.
    fn save(&self);
    /// Persist to an explicit file path. Failures are logged.
    fn save_to(&self, path: &Path);
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Self {
        match confy::load_path(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load config file, using defaults");
                Self::default()
            }
        }
    }

    fn save(&self) {
        if let Err(e) = confy::store(APP_NAME, None, self) {
            warn!(error = %e, "Failed to save config");
        }
    }

    fn save_to(&self, path: &Path) {
        if let Err(e) = confy::store_path(path, self) {
            warn!(path = %path.display(), error = %e, "Failed to save config file");
        }
    }
}
