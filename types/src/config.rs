//! Configuration sections shared across crates.
//!
//! Every section carries serde defaults so a partially written config file
//! still loads; missing keys fall back to the values below.

use serde::{Deserialize, Serialize};

/// How the previous-cycle combatant is found for a roster position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Position `i` is compared with position `i` of the previous snapshot.
    /// A reordered roster of the same length attributes deltas to the wrong slot.
    #[default]
    Index,
    /// The previous combatant is looked up by `id`.
    Id,
}

/// Where snapshots come from and how often they are polled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// `http://` / `https://` URL, otherwise a file path.
    pub location: String,
    pub poll_interval_ms: u64,
    pub match_mode: MatchMode,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            location: "battle_state.json".to_string(),
            poll_interval_ms: 250,
            match_mode: MatchMode::Index,
        }
    }
}

impl FeedSettings {
    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }
}

/// Lifetimes of the transient damage/heal cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTiming {
    /// How long a transient marker stays in the icon bar.
    pub marker_ttl_ms: u64,
    /// Duration of the name-label highlight.
    pub flash_ms: u64,
}

impl Default for EffectTiming {
    fn default() -> Self {
        Self {
            marker_ttl_ms: 600,
            flash_ms: 450,
        }
    }
}

/// Pixmap overlay appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub width: u32,
    pub row_height: u32,
    pub background_alpha: u8,
    /// When set, every rendered frame is written to this PNG file.
    pub png_path: Option<String>,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            width: 360,
            row_height: 28,
            background_alpha: 180,
            png_path: None,
        }
    }
}

/// Narrative log shown under the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleLogSettings {
    pub enabled: bool,
    pub max_lines: usize,
    /// Delay after an encounter ends before the log is wiped.
    pub clear_after_ms: u64,
}

impl Default for BattleLogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_lines: 3,
            clear_after_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sections {
        #[serde(default)]
        feed: FeedSettings,
        #[serde(default)]
        timing: EffectTiming,
        #[serde(default)]
        overlay: OverlaySettings,
        #[serde(default)]
        battle_log: BattleLogSettings,
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
[feed]
location = "http://127.0.0.1:8000/battle_state.json"
match_mode = "id"

[overlay]
png_path = "overlay.png"
"#;

        let s: Sections = toml::from_str(toml).unwrap();
        assert_eq!(s.feed.location, "http://127.0.0.1:8000/battle_state.json");
        assert!(s.feed.is_remote());
        assert_eq!(s.feed.poll_interval_ms, 250);
        assert_eq!(s.feed.match_mode, MatchMode::Id);
        assert_eq!(s.timing, EffectTiming::default());
        assert_eq!(s.overlay.png_path.as_deref(), Some("overlay.png"));
        assert_eq!(s.overlay.width, 360);
        assert_eq!(s.battle_log.max_lines, 3);
    }

    #[test]
    fn test_defaults() {
        let feed = FeedSettings::default();
        assert!(!feed.is_remote());
        assert_eq!(feed.match_mode, MatchMode::Index);

        let timing = EffectTiming::default();
        assert_eq!(timing.marker_ttl_ms, 600);
        assert_eq!(timing.flash_ms, 450);
    }
}
