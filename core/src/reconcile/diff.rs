//! Per-combatant differ.
//!
//! Two outputs per call:
//! - a [`Projection`], recomputed from the current data alone every cycle
//! - at most one [`TransientKind`], only when a previous record exists and
//!   both HP values are numeric

use fray_types::formatting::{format_hp, join_effects};
use fray_types::{Combatant, EffectTiming};
use tokio::time::Instant;

use super::slots::RenderSlot;
use super::transient::TransientKind;

/// Primary status icon. Only one renders, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusIcon {
    Dead,
    Unconscious,
    Incapacitated,
}

/// Icons in the slot's icon bar, excluding transient markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IconSet {
    pub status: Option<StatusIcon>,
    pub temp_hp: bool,
    pub concentration: bool,
    /// Pulsing low-HP heart.
    pub low_hp: bool,
}

impl IconSet {
    pub fn count(&self) -> usize {
        usize::from(self.status.is_some())
            + usize::from(self.temp_hp)
            + usize::from(self.concentration)
            + usize::from(self.low_hp)
    }
}

/// Persistent per-row state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateFlags {
    pub dead: bool,
    pub unconscious: bool,
    /// Set only when neither dead nor unconscious.
    pub incapacitated: bool,
    pub concentrating: bool,
    pub low_hp: bool,
    pub has_temp_hp: bool,
}

/// Everything a slot shows that does not depend on the previous cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub name_label: String,
    /// Custom effect names in document order.
    pub effect_names: Vec<String>,
    pub effect_label: String,
    pub hp_label: String,
    pub icons: IconSet,
    pub flags: StateFlags,
}

/// Low-HP threshold test, re-evaluated every cycle without hysteresis.
///
/// Small pools (`max_hp <= 10`) trigger only at exactly 1 HP; larger pools at
/// a quarter of the maximum, but never below 5.
pub fn is_low_hp(hp: f64, max_hp: f64) -> bool {
    if max_hp <= 10.0 {
        hp == 1.0
    } else {
        hp <= (max_hp * 0.25).floor().max(5.0)
    }
}

/// Project the persistent visual state of a combatant.
pub fn project(data: &Combatant) -> Projection {
    let e = &data.effects;

    let status = if e.dead {
        Some(StatusIcon::Dead)
    } else if e.unconscious {
        Some(StatusIcon::Unconscious)
    } else if e.incapacitated {
        Some(StatusIcon::Incapacitated)
    } else {
        None
    };

    let low_hp = match (data.hp, data.max_hp) {
        (Some(hp), Some(max)) => !e.dead && !e.unconscious && is_low_hp(hp, max),
        _ => false,
    };

    Projection {
        name_label: data.label().to_string(),
        effect_names: data.custom_effects.clone(),
        effect_label: join_effects(&data.custom_effects),
        hp_label: format_hp(data.hp, data.max_hp),
        icons: IconSet {
            status,
            temp_hp: e.temp_hp,
            concentration: e.concentration,
            low_hp,
        },
        flags: StateFlags {
            dead: e.dead,
            unconscious: e.unconscious,
            incapacitated: status == Some(StatusIcon::Incapacitated),
            concentrating: e.concentration,
            low_hp,
            has_temp_hp: e.temp_hp,
        },
    }
}

/// Transient event implied by the HP delta, if any.
pub fn transient_event(data: &Combatant, prev: Option<&Combatant>) -> Option<TransientKind> {
    let prev = prev?;
    let (Some(now), Some(before)) = (data.hp, prev.hp) else {
        return None;
    };
    if now < before {
        Some(TransientKind::Damage)
    } else if now > before {
        Some(TransientKind::Heal)
    } else {
        None
    }
}

/// Bring one slot up to date with `data`.
///
/// The projection is always applied in full. A transient event, when one
/// fires, adds an expiring marker and restarts the name flash.
pub fn reconcile(
    slot: &mut RenderSlot,
    data: &Combatant,
    prev: Option<&Combatant>,
    timing: &EffectTiming,
    now: Instant,
) -> Option<TransientKind> {
    slot.apply(project(data), data.id.clone());

    let event = transient_event(data, prev)?;
    slot.fire(event, now, timing);
    Some(event)
}
