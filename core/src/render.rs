//! Render target contract.
//!
//! The core never draws. After every cycle the scheduler hands the renderer a
//! borrowed [`OverlayView`]; backends decide how slots become pixels or text.

use tokio::time::Instant;

use crate::reconcile::RenderSlot;

/// Read-only view of everything a backend may draw for one frame.
#[derive(Debug, Clone, Copy)]
pub struct OverlayView<'a> {
    pub slots: &'a [RenderSlot],
    pub round: u32,
    /// Battle log, newest first.
    pub log_lines: &'a [String],
    /// Frame timestamp; transient markers and flashes are evaluated against it.
    pub now: Instant,
}

impl<'a> OverlayView<'a> {
    pub fn new(slots: &'a [RenderSlot], now: Instant) -> Self {
        Self {
            slots,
            round: 0,
            log_lines: &[],
            now,
        }
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    pub fn with_log(mut self, lines: &'a [String]) -> Self {
        self.log_lines = lines;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.log_lines.is_empty()
    }
}

/// A passive render backend.
pub trait EffectRenderer {
    /// Draw the current state. Called once per successful cycle.
    fn render(&mut self, view: &OverlayView<'_>);

    /// Drop everything on screen. Called on reset.
    fn clear(&mut self);
}

impl<R: EffectRenderer + ?Sized> EffectRenderer for Box<R> {
    fn render(&mut self, view: &OverlayView<'_>) {
        (**self).render(view);
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}

/// An absent backend draws nothing.
impl<R: EffectRenderer> EffectRenderer for Option<R> {
    fn render(&mut self, view: &OverlayView<'_>) {
        if let Some(r) = self {
            r.render(view);
        }
    }

    fn clear(&mut self) {
        if let Some(r) = self {
            r.clear();
        }
    }
}

/// Fans one view out to several backends in order.
impl<A: EffectRenderer, B: EffectRenderer> EffectRenderer for (A, B) {
    fn render(&mut self, view: &OverlayView<'_>) {
        self.0.render(view);
        self.1.render(view);
    }

    fn clear(&mut self) {
        self.0.clear();
        self.1.clear();
    }
}

/// Renderer that counts calls and draws nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NullRenderer {
    pub frames: u64,
    pub clears: u64,
}

impl EffectRenderer for NullRenderer {
    fn render(&mut self, _view: &OverlayView<'_>) {
        self.frames += 1;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}
