//! Self-expiring visual cues.
//!
//! A marker carries its own deadline, so expiry never depends on when the next
//! reconciliation cycle runs and one marker never touches another's timer.

use std::time::Duration;

use tokio::time::Instant;

/// Discrete event derived from an HP delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientKind {
    Damage,
    Heal,
}

impl TransientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::Heal => "heal",
        }
    }
}

/// Short-lived marker inserted at the front of a slot's icon bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientMarker {
    pub id: u64,
    pub kind: TransientKind,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl TransientMarker {
    pub fn new(id: u64, kind: TransientKind, now: Instant, ttl: Duration) -> Self {
        Self {
            id,
            kind,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

/// Fixed-duration highlight on the name label.
///
/// A slot holds at most one; a newer flash replaces the older one instead of
/// stacking, so rapid events never build up animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    pub kind: TransientKind,
    pub started_at: Instant,
    pub duration: Duration,
}

impl Flash {
    pub fn new(kind: TransientKind, now: Instant, duration: Duration) -> Self {
        Self {
            kind,
            started_at: now,
            duration,
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now >= self.started_at + self.duration
    }

    /// Elapsed fraction in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Glow strength: rises from none to full at the midpoint, then fades out.
    pub fn intensity(&self, now: Instant) -> f32 {
        let p = self.progress(now);
        if p >= 1.0 {
            0.0
        } else if p <= 0.5 {
            p * 2.0
        } else {
            (1.0 - p) * 2.0
        }
    }
}
