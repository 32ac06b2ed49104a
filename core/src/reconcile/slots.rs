//! Positional render slots and the row reconciler.

use std::time::Duration;

use fray_types::{Combatant, EffectTiming, MatchMode, Snapshot};
use tokio::time::Instant;
use tracing::trace;

use super::diff::{self, Projection};
use super::transient::{Flash, TransientKind, TransientMarker};

/// Visual allocation for one roster position.
///
/// A slot has no identity beyond its index: if the roster is reordered, the
/// slot simply shows whoever now sits at that position.
#[derive(Debug, Clone)]
pub struct RenderSlot {
    index: usize,
    turn_active: bool,
    combatant_id: Option<String>,
    projection: Projection,
    markers: Vec<TransientMarker>,
    flash: Option<Flash>,
    next_marker_id: u64,
}

impl RenderSlot {
    /// Empty slot for roster position `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            turn_active: false,
            combatant_id: None,
            projection: Projection::default(),
            markers: Vec::new(),
            flash: None,
            next_marker_id: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_turn_active(&self) -> bool {
        self.turn_active
    }

    pub fn set_turn_active(&mut self, active: bool) {
        self.turn_active = active;
    }

    /// Id of the combatant shown in the last cycle.
    pub fn combatant_id(&self) -> Option<&str> {
        self.combatant_id.as_deref()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Replace the persistent state wholesale.
    pub fn apply(&mut self, projection: Projection, combatant_id: Option<String>) {
        self.projection = projection;
        self.combatant_id = combatant_id;
    }

    /// Record a transient event: one new marker plus a fresh name flash.
    pub fn fire(&mut self, kind: TransientKind, now: Instant, timing: &EffectTiming) {
        let ttl = Duration::from_millis(timing.marker_ttl_ms);
        self.markers
            .push(TransientMarker::new(self.next_marker_id, kind, now, ttl));
        self.next_marker_id += 1;
        self.flash = Some(Flash::new(
            kind,
            now,
            Duration::from_millis(timing.flash_ms),
        ));
    }

    /// Markers still visible at `now`, newest first (they are prepended in the bar).
    pub fn markers_at(&self, now: Instant) -> impl Iterator<Item = &TransientMarker> {
        self.markers.iter().rev().filter(move |m| !m.is_expired(now))
    }

    /// All markers currently held, expired or not.
    pub fn markers(&self) -> &[TransientMarker] {
        &self.markers
    }

    /// The running name flash at `now`, if any.
    pub fn flash_at(&self, now: Instant) -> Option<&Flash> {
        self.flash.as_ref().filter(|f| !f.is_finished(now))
    }

    /// Drop expired markers and a finished flash. Returns the markers removed.
    pub fn prune_expired(&mut self, now: Instant) -> usize {
        let before = self.markers.len();
        self.markers.retain(|m| !m.is_expired(now));
        if self.flash.is_some_and(|f| f.is_finished(now)) {
            self.flash = None;
        }
        before - self.markers.len()
    }
}

/// A transient event fired during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEvent {
    pub index: usize,
    pub kind: TransientKind,
    pub combatant_id: Option<String>,
}

/// Outcome of one [`RowReconciler::sync`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub released: usize,
    pub events: Vec<SlotEvent>,
}

impl SyncReport {
    pub fn count(&self, kind: TransientKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Keeps one slot per combatant and feeds each through the differ.
#[derive(Debug, Clone)]
pub struct RowReconciler {
    slots: Vec<RenderSlot>,
    match_mode: MatchMode,
    timing: EffectTiming,
}

impl RowReconciler {
    pub fn new(match_mode: MatchMode, timing: EffectTiming) -> Self {
        Self {
            slots: Vec::new(),
            match_mode,
            timing,
        }
    }

    pub fn slots(&self) -> &[RenderSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Align slots with `current` and reconcile every position.
    ///
    /// Afterwards the slot count equals `current.combatants.len()`.
    pub fn sync(
        &mut self,
        current: &Snapshot,
        previous: Option<&Snapshot>,
        now: Instant,
    ) -> SyncReport {
        let mut report = SyncReport::default();
        let target = current.combatants.len();

        while self.slots.len() < target {
            self.slots.push(RenderSlot::new(self.slots.len()));
            report.created += 1;
        }
        if self.slots.len() > target {
            // Truncation drops the slots and everything they own.
            report.released = self.slots.len() - target;
            self.slots.truncate(target);
        }

        for (i, data) in current.combatants.iter().enumerate() {
            let prev = self.previous_for(i, data, previous);
            let slot = &mut self.slots[i];
            slot.prune_expired(now);

            if let Some(kind) = diff::reconcile(slot, data, prev, &self.timing, now) {
                trace!(slot = i, kind = kind.as_str(), "transient event");
                report.events.push(SlotEvent {
                    index: i,
                    kind,
                    combatant_id: data.id.clone(),
                });
            }

            slot.set_turn_active(current.is_active(data.id.as_deref()));
        }

        report
    }

    /// Release every slot. Returns how many were dropped.
    pub fn reset(&mut self) -> usize {
        let released = self.slots.len();
        self.slots.clear();
        released
    }

    /// Drop expired transient state from every slot.
    pub fn prune_expired(&mut self, now: Instant) -> usize {
        self.slots.iter_mut().map(|s| s.prune_expired(now)).sum()
    }

    fn previous_for<'a>(
        &self,
        index: usize,
        data: &Combatant,
        previous: Option<&'a Snapshot>,
    ) -> Option<&'a Combatant> {
        let previous = previous?;
        match self.match_mode {
            MatchMode::Index => previous.combatants.get(index),
            MatchMode::Id => previous.find(data.id.as_deref()?),
        }
    }
}
