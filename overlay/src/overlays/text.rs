//! Text rendering of the roster
//!
//! ```text
//! Round 3
//! ▶ ⚡🛡️ Aria* 12/40  Blessed • Hasted
//!   💀 Goblin 0/7
//! · Aria takes damage
//! ```
//!
//! A name wrapped in `*` is flashing for damage, in `+` for a heal.

use std::io::Write;

use fray_core::{EffectRenderer, OverlayView, TransientKind};
use tracing::warn;

use crate::utils::formatting::format_round;
use crate::widgets::CombatRow;

const TURN_MARKER: &str = "▶";

/// Renders frames as text and remembers the last one.
pub struct TextOverlay {
    writer: Option<Box<dyn Write + Send>>,
    current: String,
    changed: bool,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl TextOverlay {
    /// Keep frames in memory only.
    pub fn new() -> Self {
        Self {
            writer: None,
            current: String::new(),
            changed: false,
        }
    }

    /// Also write every changed frame to `writer`.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            ..Self::new()
        }
    }

    /// The last rendered frame.
    pub fn frame(&self) -> &str {
        &self.current
    }

    /// Whether the frame changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Format one row.
    pub fn row_line(row: &CombatRow) -> String {
        let mut line = String::new();
        line.push_str(if row.turn_active { TURN_MARKER } else { " " });
        line.push(' ');

        let glyphs = row.glyphs();
        if !glyphs.is_empty() {
            line.push_str(&glyphs);
            line.push(' ');
        }

        match row.flash.map(|f| f.kind) {
            Some(TransientKind::Damage) => line.push_str(&format!("*{}*", row.name)),
            Some(TransientKind::Heal) => line.push_str(&format!("+{}+", row.name)),
            None => line.push_str(&row.name),
        }
        if !row.hp.is_empty() {
            line.push(' ');
            line.push_str(&row.hp);
        }
        if !row.effects.is_empty() {
            line.push_str("  ");
            line.push_str(&row.effects);
        }
        line
    }

    fn compose(view: &OverlayView<'_>) -> String {
        let mut lines = Vec::with_capacity(view.slots.len() + view.log_lines.len() + 1);
        let round = format_round(view.round);
        if !round.is_empty() {
            lines.push(round);
        }
        for slot in view.slots {
            lines.push(Self::row_line(&CombatRow::from_slot(slot, view.now)));
        }
        for entry in view.log_lines {
            lines.push(format!("· {entry}"));
        }
        lines.join("\n")
    }

    fn show(&mut self, frame: String) {
        if frame == self.current {
            return;
        }
        self.current = frame;
        self.changed = true;

        if let Some(writer) = self.writer.as_mut() {
            let result = writeln!(writer, "{}\n", self.current).and_then(|_| writer.flush());
            if let Err(e) = result {
                warn!(error = %e, "Failed to write text overlay, disabling output");
                self.writer = None;
            }
        }
    }
}

impl EffectRenderer for TextOverlay {
    fn render(&mut self, view: &OverlayView<'_>) {
        self.show(Self::compose(view));
    }

    fn clear(&mut self) {
        self.show(String::new());
    }
}
