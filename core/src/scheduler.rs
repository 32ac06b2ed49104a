//! Poll → reconcile → render loop.
//!
//! ```text
//!   interval tick ──► poll().await ──► running? ──no──► reset
//!                                         │
//!                                        yes
//!                                         ▼
//!                         battle log ◄── sync(current, previous) ──► render
//!                                         │
//!                                previous = current
//! ```
//!
//! A cycle runs to completion before the next tick is taken; ticks that fall
//! due while a poll is outstanding are skipped, never queued.

use std::time::Duration;

use fray_types::Snapshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::battle_log::BattleLog;
use crate::context::AppConfig;
use crate::reconcile::{RenderSlot, RowReconciler, SyncReport};
use crate::render::{EffectRenderer, OverlayView};
use crate::source::SnapshotSource;

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A running encounter was reconciled.
    Synced(SyncReport),
    /// No snapshot, or no encounter. `reset` is false when already idle.
    Idle { reset: bool },
}

/// Owns all mutable overlay state and drives it from one task.
pub struct Scheduler<S, R> {
    source: S,
    renderer: R,
    reconciler: RowReconciler,
    battle_log: BattleLog,
    previous: Option<Snapshot>,
    period: Duration,
    round: u32,
}

impl<S: SnapshotSource, R: EffectRenderer> Scheduler<S, R> {
    pub fn new(source: S, renderer: R, config: &AppConfig) -> Self {
        Self {
            source,
            renderer,
            reconciler: RowReconciler::new(config.feed.match_mode, config.timing),
            battle_log: BattleLog::new(config.battle_log),
            previous: None,
            period: config.poll_interval(),
            round: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn slots(&self) -> &[RenderSlot] {
        self.reconciler.slots()
    }

    /// Snapshot stored by the last successful cycle.
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn battle_log(&self) -> &BattleLog {
        &self.battle_log
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Run one cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        let polled = self.source.poll().await;
        let now = Instant::now();

        let running = polled.as_ref().is_some_and(|s| s.running);
        self.track_encounter(running, polled.as_ref());
        let announced = self.battle_log.set_running(running, now);

        let Some(current) = polled.filter(|s| s.running) else {
            let reset = self.reset();
            if announced {
                self.render(now);
            } else if self.battle_log.expire(now) {
                self.renderer.clear();
            }
            return TickOutcome::Idle { reset };
        };

        if let Some(previous) = &self.previous {
            self.battle_log.observe(previous, &current);
        }
        let report = self.reconciler.sync(&current, self.previous.as_ref(), now);
        debug!(
            combatants = current.combatants.len(),
            events = report.events.len(),
            created = report.created,
            released = report.released,
            "cycle reconciled"
        );

        self.round = current.round;
        self.previous = Some(current);
        self.render(now);
        TickOutcome::Synced(report)
    }

    /// Release every slot and forget the previous snapshot.
    ///
    /// Returns false when there was nothing to clear, in which case the
    /// renderer is not touched.
    pub fn reset(&mut self) -> bool {
        let released = self.reconciler.reset();
        let had_previous = self.previous.take().is_some();
        self.round = 0;

        let cleared = released > 0 || had_previous;
        if cleared {
            debug!(released, "overlay reset");
            self.renderer.clear();
        }
        cleared
    }

    /// Tick at the configured period until `shutdown` resolves.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(period_ms = self.period.as_millis() as u64, "scheduler started");
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }
            // Nothing after the poll awaits, so dropping a cycle here leaves state intact.
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.tick() => {}
            }
        }
        info!("scheduler stopped");
    }

    fn render(&mut self, now: Instant) {
        let view = OverlayView::new(self.reconciler.slots(), now)
            .with_round(self.round)
            .with_log(self.battle_log.lines());
        self.renderer.render(&view);
    }

    fn track_encounter(&mut self, running: bool, polled: Option<&Snapshot>) {
        if running == self.battle_log.is_running() {
            return;
        }
        if running {
            let combatants = polled.map_or(0, |s| s.combatants.len());
            info!(combatants, "encounter started");
        } else if polled.is_some() {
            info!("encounter ended");
        } else {
            info!("snapshot feed lost, overlay idle");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use fray_types::Combatant;

    use super::*;
    use crate::battle_log::{ENCOUNTER_ENDED, ENCOUNTER_STARTED};
    use crate::reconcile::TransientKind;

    /// Replays a fixed list of poll results, then reports no snapshot.
    #[derive(Default)]
    struct ScriptedSource {
        script: VecDeque<Option<Snapshot>>,
        delay: Duration,
        polls: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Option<Snapshot>>) -> Self {
            Self {
                script: script.into(),
                ..Default::default()
            }
        }
    }

    impl SnapshotSource for ScriptedSource {
        async fn poll(&mut self) -> Option<Snapshot> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let depth = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(depth, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.script.pop_front().flatten()
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: usize,
        clears: usize,
        last_rows: usize,
        last_round: u32,
        last_log: Vec<String>,
        markers_seen: usize,
    }

    impl EffectRenderer for RecordingRenderer {
        fn render(&mut self, view: &OverlayView<'_>) {
            self.frames += 1;
            self.last_rows = view.slots.len();
            self.last_round = view.round;
            self.last_log = view.log_lines.to_vec();
            self.markers_seen = view
                .slots
                .iter()
                .map(|s| s.markers_at(view.now).count())
                .sum();
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.last_rows = 0;
        }
    }

    fn fighter(id: &str, hp: f64) -> Combatant {
        Combatant {
            id: Some(id.to_string()),
            name: id.to_string(),
            hp: Some(hp),
            max_hp: Some(40.0),
            ..Default::default()
        }
    }

    fn live(round: u32, combatants: Vec<Combatant>) -> Option<Snapshot> {
        Some(Snapshot {
            running: true,
            round,
            combatants,
            ..Default::default()
        })
    }

    fn scheduler(script: Vec<Option<Snapshot>>) -> Scheduler<ScriptedSource, RecordingRenderer> {
        Scheduler::new(
            ScriptedSource::new(script),
            RecordingRenderer::default(),
            &AppConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_then_damage() {
        let mut s = scheduler(vec![
            live(1, vec![fighter("a", 30.0), fighter("b", 30.0)]),
            live(1, vec![fighter("a", 22.0), fighter("b", 30.0)]),
        ]);

        let TickOutcome::Synced(first) = s.tick().await else {
            panic!("expected a synced cycle");
        };
        assert!(first.events.is_empty());
        assert_eq!(first.created, 2);
        assert_eq!(s.renderer().last_rows, 2);

        let TickOutcome::Synced(second) = s.tick().await else {
            panic!("expected a synced cycle");
        };
        assert_eq!(second.count(TransientKind::Damage), 1);
        assert_eq!(s.renderer().markers_seen, 1);
        assert_eq!(s.previous().unwrap().combatants[0].hp, Some(22.0));
        assert_eq!(s.renderer().last_round, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_encounter_flag_follows_feed() {
        let mut s = scheduler(vec![live(1, vec![fighter("a", 30.0)]), None]);
        assert_eq!(s.period(), Duration::from_millis(250));
        assert!(!s.battle_log().is_running());

        s.tick().await;
        assert!(s.battle_log().is_running());

        s.tick().await;
        assert!(!s.battle_log().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_snapshot_resets_once() {
        let mut s = scheduler(vec![live(2, vec![fighter("a", 30.0)]), None, None]);
        s.tick().await;
        assert_eq!(s.slots().len(), 1);

        assert_eq!(s.tick().await, TickOutcome::Idle { reset: true });
        assert!(s.slots().is_empty());
        assert!(s.previous().is_none());
        assert_eq!(s.round(), 0);
        let clears = s.renderer().clears;

        assert_eq!(s.tick().await, TickOutcome::Idle { reset: false });
        assert_eq!(s.renderer().clears, clears);
        assert!(!s.reset());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_running_is_idle() {
        let mut stopped = live(1, vec![fighter("a", 30.0)]).unwrap();
        stopped.running = false;
        let mut s = scheduler(vec![live(1, vec![fighter("a", 30.0)]), Some(stopped)]);
        s.tick().await;
        assert_eq!(s.tick().await, TickOutcome::Idle { reset: true });
        assert!(s.slots().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_forgets_previous_for_diffing() {
        let mut s = scheduler(vec![
            live(1, vec![fighter("a", 30.0)]),
            None,
            live(1, vec![fighter("a", 5.0)]),
        ]);
        s.tick().await;
        s.tick().await;
        // After a reset the next cycle is a first cycle again.
        let TickOutcome::Synced(report) = s.tick().await else {
            panic!("expected a synced cycle");
        };
        assert!(report.events.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_previous_is_independent() {
        let mut shared = live(1, vec![fighter("a", 30.0)]).unwrap();
        let mut s = scheduler(vec![Some(shared.clone())]);
        s.tick().await;

        shared.combatants[0].hp = Some(1.0);
        shared.combatants.push(fighter("b", 2.0));
        let stored = s.previous().unwrap();
        assert_eq!(stored.combatants.len(), 1);
        assert_eq!(stored.combatants[0].hp, Some(30.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_battle_log_across_encounter() {
        let mut s = scheduler(vec![
            live(1, vec![fighter("a", 30.0)]),
            live(1, vec![fighter("a", 20.0)]),
            None,
            None,
        ]);

        s.tick().await;
        assert_eq!(s.renderer().last_log, [ENCOUNTER_STARTED]);

        s.tick().await;
        assert_eq!(s.renderer().last_log, ["a takes damage", ENCOUNTER_STARTED]);

        // Slots go, the log stays up until the clear delay passes.
        let frames = s.renderer().frames;
        assert_eq!(s.tick().await, TickOutcome::Idle { reset: true });
        assert_eq!(s.renderer().frames, frames + 1);
        assert_eq!(s.renderer().last_rows, 0);
        assert_eq!(s.renderer().last_log[0], ENCOUNTER_ENDED);

        let clears = s.renderer().clears;
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(s.tick().await, TickOutcome::Idle { reset: false });
        assert!(s.battle_log().is_empty());
        assert_eq!(s.renderer().clears, clears + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_markers_expire_between_cycles() {
        let mut s = scheduler(vec![
            live(1, vec![fighter("a", 30.0)]),
            live(1, vec![fighter("a", 20.0)]),
            live(1, vec![fighter("a", 20.0)]),
        ]);
        s.tick().await;
        s.tick().await;
        assert_eq!(s.renderer().markers_seen, 1);

        tokio::time::advance(Duration::from_millis(600)).await;
        s.tick().await;
        assert_eq!(s.renderer().markers_seen, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_never_overlaps_polls() {
        let script = (0..20).map(|i| live(1, vec![fighter("a", 30.0 - i as f64)])).collect();
        let mut source = ScriptedSource::new(script);
        source.delay = Duration::from_millis(600);
        let polls = Arc::clone(&source.polls);
        let max_in_flight = Arc::clone(&source.max_in_flight);

        let mut s = Scheduler::new(source, RecordingRenderer::default(), &AppConfig::default());
        s.run(tokio::time::sleep(Duration::from_secs(3))).await;

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        let polls = polls.load(Ordering::SeqCst);
        // A 600ms poll on a 250ms period: overdue ticks are skipped, not queued.
        assert!((3..=5).contains(&polls), "polls = {polls}");
        assert!(s.renderer().frames >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let mut s = scheduler(vec![]);
        s.run(tokio::time::sleep(Duration::from_millis(1_000))).await;
        let polls = s.source.polls.load(Ordering::SeqCst);
        assert!((4..=5).contains(&polls), "polls = {polls}");
        assert_eq!(s.renderer().frames, 0);
    }
}
