//! Tests for the row reconciler
//!
//! Covers slot lifecycle, transient events, turn highlighting and the two
//! matching modes.

use std::time::Duration;

use fray_types::{Combatant, EffectTiming, MatchMode, Snapshot};
use tokio::time::Instant;

use super::slots::RowReconciler;
use super::transient::TransientKind;

fn combatant(id: &str, hp: Option<f64>) -> Combatant {
    Combatant {
        id: Some(id.to_string()),
        name: id.to_uppercase(),
        hp,
        max_hp: Some(40.0),
        ..Default::default()
    }
}

fn snapshot(combatants: Vec<Combatant>, active: &[&str]) -> Snapshot {
    Snapshot {
        running: true,
        round: 1,
        active_ids: active.iter().map(|s| s.to_string()).collect(),
        combatants,
        ..Default::default()
    }
}

fn roster(n: usize) -> Snapshot {
    snapshot(
        (0..n)
            .map(|i| combatant(&format!("c{i}"), Some(30.0)))
            .collect(),
        &[],
    )
}

fn reconciler() -> RowReconciler {
    RowReconciler::new(MatchMode::Index, EffectTiming::default())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Slot lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_slot_count_follows_roster() {
    let mut rows = reconciler();
    let now = Instant::now();

    let three = roster(3);
    let report = rows.sync(&three, None, now);
    assert_eq!(rows.len(), 3);
    assert_eq!(report.created, 3);

    let five = roster(5);
    let report = rows.sync(&five, Some(&three), now);
    assert_eq!(rows.len(), 5);
    assert_eq!(report.created, 2);
    assert_eq!(report.released, 0);

    let two = roster(2);
    let report = rows.sync(&two, Some(&five), now);
    assert_eq!(rows.len(), 2);
    assert_eq!(report.released, 3);
    assert!(rows.slots().iter().enumerate().all(|(i, s)| s.index() == i));
}

#[test]
fn test_shrink_releases_transient_state() {
    let mut rows = reconciler();
    let now = Instant::now();
    let before = snapshot(
        vec![combatant("a", Some(30.0)), combatant("b", Some(30.0))],
        &[],
    );
    rows.sync(&before, None, now);

    let hit = snapshot(
        vec![combatant("a", Some(30.0)), combatant("b", Some(20.0))],
        &[],
    );
    rows.sync(&hit, Some(&before), now);
    assert_eq!(rows.slots()[1].markers().len(), 1);

    let shrunk = snapshot(vec![combatant("a", Some(30.0))], &[]);
    rows.sync(&shrunk, Some(&hit), now);
    assert_eq!(rows.len(), 1);

    // Regrowing yields a fresh slot, not the released one.
    rows.sync(&hit, Some(&shrunk), now);
    assert!(rows.slots()[1].markers().is_empty());
    assert!(rows.slots()[1].flash_at(now).is_none());
}

#[test]
fn test_reset_is_idempotent() {
    let mut rows = reconciler();
    rows.sync(&roster(4), None, Instant::now());
    assert_eq!(rows.reset(), 4);
    assert_eq!(rows.reset(), 0);
    assert!(rows.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Transient events
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_first_cycle_emits_nothing() {
    let mut rows = reconciler();
    let report = rows.sync(&roster(3), None, Instant::now());
    assert!(report.events.is_empty());
    assert!(rows.slots().iter().all(|s| s.markers().is_empty()));
}

#[test]
fn test_damage_and_heal_per_slot() {
    let mut rows = reconciler();
    let now = Instant::now();
    let before = snapshot(
        vec![
            combatant("a", Some(30.0)),
            combatant("b", Some(30.0)),
            combatant("c", Some(30.0)),
        ],
        &[],
    );
    rows.sync(&before, None, now);

    let after = snapshot(
        vec![
            combatant("a", Some(25.0)),
            combatant("b", Some(35.0)),
            combatant("c", Some(30.0)),
        ],
        &[],
    );
    let report = rows.sync(&after, Some(&before), now + ms(250));

    assert_eq!(report.count(TransientKind::Damage), 1);
    assert_eq!(report.count(TransientKind::Heal), 1);
    assert_eq!(report.events[0].index, 0);
    assert_eq!(report.events[0].kind, TransientKind::Damage);
    assert_eq!(report.events[1].index, 1);
    assert_eq!(report.events[1].kind, TransientKind::Heal);
    assert_eq!(report.events[1].combatant_id.as_deref(), Some("b"));

    let t = now + ms(250);
    assert_eq!(rows.slots()[0].flash_at(t).map(|f| f.kind), Some(TransientKind::Damage));
    assert_eq!(rows.slots()[1].flash_at(t).map(|f| f.kind), Some(TransientKind::Heal));
    assert!(rows.slots()[2].flash_at(t).is_none());
}

#[test]
fn test_non_numeric_hp_skips_events() {
    let mut rows = reconciler();
    let now = Instant::now();
    let before = snapshot(vec![combatant("a", None), combatant("b", Some(10.0))], &[]);
    rows.sync(&before, None, now);

    let after = snapshot(vec![combatant("a", Some(5.0)), combatant("b", None)], &[]);
    let report = rows.sync(&after, Some(&before), now);
    assert!(report.events.is_empty());
    assert_eq!(rows.slots()[0].projection().hp_label, "5/40");
}

#[test]
fn test_markers_expire_independently() {
    let mut rows = reconciler();
    let t0 = Instant::now();
    let s0 = snapshot(vec![combatant("a", Some(30.0))], &[]);
    let s1 = snapshot(vec![combatant("a", Some(20.0))], &[]);
    let s2 = snapshot(vec![combatant("a", Some(10.0))], &[]);

    rows.sync(&s0, None, t0);
    rows.sync(&s1, Some(&s0), t0 + ms(100));
    rows.sync(&s2, Some(&s1), t0 + ms(300));

    let slot = &rows.slots()[0];
    assert_eq!(slot.markers_at(t0 + ms(350)).count(), 2);
    // First marker expires at 700, second at 900.
    assert_eq!(slot.markers_at(t0 + ms(699)).count(), 2);
    assert_eq!(slot.markers_at(t0 + ms(700)).count(), 1);
    assert_eq!(slot.markers_at(t0 + ms(899)).count(), 1);
    assert_eq!(slot.markers_at(t0 + ms(900)).count(), 0);

    let ids: Vec<u64> = slot.markers_at(t0 + ms(350)).map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 0], "newest marker comes first");
}

#[test]
fn test_markers_expire_without_further_cycles() {
    let mut rows = reconciler();
    let t0 = Instant::now();
    let s0 = snapshot(vec![combatant("a", Some(30.0))], &[]);
    let s1 = snapshot(vec![combatant("a", Some(31.0))], &[]);
    rows.sync(&s0, None, t0);
    rows.sync(&s1, Some(&s0), t0);

    // No sync happens after t0; visibility is a function of time alone.
    assert_eq!(rows.slots()[0].markers_at(t0 + ms(599)).count(), 1);
    assert_eq!(rows.slots()[0].markers_at(t0 + ms(600)).count(), 0);

    assert_eq!(rows.prune_expired(t0 + ms(600)), 1);
    assert!(rows.slots()[0].markers().is_empty());
}

#[test]
fn test_flash_replaced_not_stacked() {
    let mut rows = reconciler();
    let t0 = Instant::now();
    let s0 = snapshot(vec![combatant("a", Some(30.0))], &[]);
    let s1 = snapshot(vec![combatant("a", Some(20.0))], &[]);
    let s2 = snapshot(vec![combatant("a", Some(25.0))], &[]);
    rows.sync(&s0, None, t0);
    rows.sync(&s1, Some(&s0), t0);
    rows.sync(&s2, Some(&s1), t0 + ms(200));

    let flash = rows.slots()[0].flash_at(t0 + ms(300)).copied().unwrap();
    assert_eq!(flash.kind, TransientKind::Heal);
    assert_eq!(flash.started_at, t0 + ms(200));
    assert!(rows.slots()[0].flash_at(t0 + ms(650)).is_none());
}

#[test]
fn test_expired_markers_do_not_accumulate() {
    let mut rows = reconciler();
    let t0 = Instant::now();
    let mut prev = snapshot(vec![combatant("a", Some(100.0))], &[]);
    rows.sync(&prev, None, t0);

    for step in 1..=20u64 {
        let next = snapshot(vec![combatant("a", Some(100.0 - step as f64))], &[]);
        rows.sync(&next, Some(&prev), t0 + ms(step * 250));
        prev = next;
    }
    // 600ms window at a 250ms cadence keeps at most three markers alive.
    assert!(rows.slots()[0].markers().len() <= 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Turn highlighting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_turn_active_flag_follows_active_ids() {
    let mut rows = reconciler();
    let now = Instant::now();
    let first = snapshot(
        vec![combatant("a", Some(30.0)), combatant("b", Some(30.0))],
        &["a"],
    );
    rows.sync(&first, None, now);
    assert!(rows.slots()[0].is_turn_active());
    assert!(!rows.slots()[1].is_turn_active());

    let second = snapshot(
        vec![combatant("a", Some(30.0)), combatant("b", Some(30.0))],
        &["b"],
    );
    let report = rows.sync(&second, Some(&first), now);
    assert!(report.events.is_empty());
    assert!(!rows.slots()[0].is_turn_active());
    assert!(rows.slots()[1].is_turn_active());
}

#[test]
fn test_combatant_without_id_is_never_active() {
    let mut rows = reconciler();
    let mut anon = combatant("x", Some(1.0));
    anon.id = None;
    rows.sync(&snapshot(vec![anon], &["x"]), None, Instant::now());
    assert!(!rows.slots()[0].is_turn_active());
}

// ─────────────────────────────────────────────────────────────────────────────
// Matching modes
// ─────────────────────────────────────────────────────────────────────────────

fn reordered_pair() -> (Snapshot, Snapshot) {
    let before = snapshot(
        vec![combatant("a", Some(30.0)), combatant("b", Some(10.0))],
        &[],
    );
    let after = snapshot(
        vec![combatant("b", Some(10.0)), combatant("a", Some(30.0))],
        &[],
    );
    (before, after)
}

#[test]
fn test_index_mode_correlates_by_position() {
    let (before, after) = reordered_pair();
    let mut rows = reconciler();
    let now = Instant::now();
    rows.sync(&before, None, now);
    let report = rows.sync(&after, Some(&before), now);

    // Nobody's HP changed, but positions swapped.
    assert_eq!(report.count(TransientKind::Damage), 1);
    assert_eq!(report.count(TransientKind::Heal), 1);
    assert_eq!(rows.slots()[0].combatant_id(), Some("b"));
}

#[test]
fn test_id_mode_correlates_by_id() {
    let (before, after) = reordered_pair();
    let mut rows = RowReconciler::new(MatchMode::Id, EffectTiming::default());
    let now = Instant::now();
    rows.sync(&before, None, now);
    let report = rows.sync(&after, Some(&before), now);
    assert!(report.events.is_empty());

    let mut hurt = after.clone();
    hurt.combatants[1].hp = Some(12.0);
    let report = rows.sync(&hurt, Some(&after), now);
    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].index, 1);
    assert_eq!(report.events[0].combatant_id.as_deref(), Some("a"));
}

#[test]
fn test_id_mode_new_combatant_has_no_previous() {
    let before = snapshot(vec![combatant("a", Some(30.0))], &[]);
    let after = snapshot(
        vec![combatant("a", Some(30.0)), combatant("z", Some(1.0))],
        &[],
    );
    let mut rows = RowReconciler::new(MatchMode::Id, EffectTiming::default());
    let now = Instant::now();
    rows.sync(&before, None, now);
    assert!(rows.sync(&after, Some(&before), now).events.is_empty());
}
