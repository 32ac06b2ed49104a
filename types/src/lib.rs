//! Shared types for the FRAY combat overlay.
//!
//! - [`snapshot`]: the combat-state document polled from the producer
//! - [`config`]: configuration sections shared by core, overlay and cli
//! - [`formatting`]: small display helpers used by every renderer

pub mod config;
pub mod formatting;
pub mod snapshot;

pub use config::{BattleLogSettings, EffectTiming, FeedSettings, MatchMode, OverlaySettings};
pub use snapshot::{Combatant, CombatantKind, CombatantState, EffectFlags, Snapshot};
