//! Short narrative feed shown under the roster.
//!
//! Unlike the row reconciler, the log correlates combatants by `id`: a line
//! such as "Aria falls" must name the right entity even if the roster order
//! shifts. Combatants without a previous match say nothing.
//!
//! ```text
//!   inactive ──► running      "Encounter started"  (cancels a pending clear)
//!   running  ──► inactive     "Encounter ended"    (clear scheduled)
//!   inactive ... +clear_after  lines wiped
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

use fray_types::{BattleLogSettings, Combatant, CombatantState, Snapshot};
use tokio::time::Instant;
use tracing::debug;

pub const ENCOUNTER_STARTED: &str = "Encounter started";
pub const ENCOUNTER_ENDED: &str = "Encounter ended";

/// Rolling list of the most recent lines, newest first.
#[derive(Debug, Clone)]
pub struct BattleLog {
    settings: BattleLogSettings,
    lines: Vec<String>,
    running: bool,
    clear_at: Option<Instant>,
}

impl BattleLog {
    pub fn new(settings: BattleLogSettings) -> Self {
        Self {
            settings,
            lines: Vec::new(),
            running: false,
            clear_at: None,
        }
    }

    /// Current lines, newest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Prepend a line, dropping the oldest past `max_lines`.
    pub fn push(&mut self, line: impl Into<String>) {
        if !self.settings.enabled || self.settings.max_lines == 0 {
            return;
        }
        let line = line.into();
        if line.is_empty() {
            return;
        }
        self.lines.insert(0, line);
        self.lines.truncate(self.settings.max_lines);
    }

    /// Track encounter transitions. Returns true when a line was added.
    pub fn set_running(&mut self, running: bool, now: Instant) -> bool {
        if running == self.running {
            return false;
        }
        self.running = running;

        if running {
            self.clear_at = None;
            self.push(ENCOUNTER_STARTED);
        } else {
            self.clear_at = Some(now + Duration::from_millis(self.settings.clear_after_ms));
            self.push(ENCOUNTER_ENDED);
        }
        self.settings.enabled
    }

    /// Wipe the log once the post-encounter delay has passed.
    ///
    /// Returns true when lines were removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) if now >= deadline => {
                self.clear_at = None;
                let had_lines = !self.lines.is_empty();
                self.lines.clear();
                if had_lines {
                    debug!("battle log cleared");
                }
                had_lines
            }
            _ => false,
        }
    }

    /// Append lines for everything that changed between two snapshots.
    pub fn observe(&mut self, previous: &Snapshot, current: &Snapshot) {
        if !self.settings.enabled {
            return;
        }
        for line in describe_changes(previous, current) {
            self.push(line);
        }
    }
}

/// Lines describing the change from `previous` to `current`, oldest first.
pub fn describe_changes(previous: &Snapshot, current: &Snapshot) -> Vec<String> {
    let mut out = Vec::new();
    for cur in &current.combatants {
        let Some(prev) = cur.id.as_deref().and_then(|id| previous.find(id)) else {
            continue;
        };
        describe_combatant(prev, cur, &mut out);
    }
    out
}

fn describe_combatant(prev: &Combatant, cur: &Combatant, out: &mut Vec<String>) {
    let name = cur.label();
    let mut say = |suffix: &str| out.push(format!("{name} {suffix}"));

    // State changes suppress the hp and condition lines.
    if prev.state != cur.state {
        match (&prev.state, &cur.state) {
            (_, CombatantState::Dead) => say("falls"),
            (_, CombatantState::Unconscious) => say("is unconscious"),
            (_, CombatantState::Left) => say("leaves the fight"),
            (CombatantState::Dead, CombatantState::Alive) => say("is revived"),
            (CombatantState::Left, CombatantState::Alive) => say("returns to the fight"),
            (_, CombatantState::Alive) => say("comes to"),
            (_, other) => say(&format!("is now {}", other.as_str())),
        }
    } else {
        let hp_rose = matches!((prev.hp, cur.hp), (Some(a), Some(b)) if b > a);
        let hp_changed = matches!((prev.hp, cur.hp), (Some(a), Some(b)) if b != a);

        // Non-numeric temp pools never count as changed.
        let temp = prev.temp_hp.zip(cur.temp_hp);
        let temp_changed = matches!(temp, Some((a, b)) if b != a);
        let temp_rose = matches!(temp, Some((a, b)) if b > a);
        let temp_lost = matches!(temp, Some((a, b)) if a > 0.0 && b == 0.0);

        if hp_changed || temp_changed {
            if hp_rose {
                say("regains HP");
            } else if temp_rose {
                say("gains temporary HP");
            } else {
                say("takes damage");
                if temp_lost {
                    say("loses temporary HP");
                }
            }
        }

        match (prev.effects.concentration, cur.effects.concentration) {
            (false, true) => say("starts concentrating"),
            (true, false) => say("loses concentration"),
            _ => {}
        }
        match (prev.effects.incapacitated, cur.effects.incapacitated) {
            (false, true) => say("is incapacitated"),
            (true, false) => say("can act again"),
            _ => {}
        }
    }

    let before: BTreeSet<&str> = prev.custom_effects.iter().map(String::as_str).collect();
    let after: BTreeSet<&str> = cur.custom_effects.iter().map(String::as_str).collect();
    for gained in after.difference(&before) {
        say(&format!("gains effect {gained}"));
    }
    for lost in before.difference(&after) {
        say(&format!("loses effect {lost}"));
    }
}
