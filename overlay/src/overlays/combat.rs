//! Combat roster overlay
//!
//! Draws one [`CombatRow`] per slot onto a headless pixmap. The surface grows
//! and shrinks with the roster; when a PNG path is configured every committed
//! frame is written there.

use std::path::PathBuf;

use fray_core::{EffectRenderer, OverlayView};
use fray_types::OverlaySettings;
use tokio::time::Instant;
use tracing::warn;

use super::pulse_phase;
use crate::frame::{FrameError, OverlayFrame};
use crate::utils::fade;
use crate::widgets::{CombatRow, colors};

/// Base dimensions for scaling calculations
const BASE_WIDTH: f32 = 360.0;
const BASE_ROW_HEIGHT: f32 = 28.0;
const BASE_PADDING: f32 = 6.0;
const BASE_ROUND_STRIP: f32 = 4.0;
const BASE_LOG_LINE: f32 = 8.0;
/// Round ticks are capped so long fights keep a readable strip
const MAX_ROUND_TICKS: u32 = 20;

pub struct CombatOverlay {
    frame: OverlayFrame,
    settings: OverlaySettings,
    png_path: Option<PathBuf>,
    started: Option<Instant>,
}

impl CombatOverlay {
    pub fn new(settings: OverlaySettings) -> Result<Self, FrameError> {
        let mut frame = OverlayFrame::new(settings.width.max(1), 1, BASE_WIDTH)?;
        frame.set_background_alpha(settings.background_alpha);

        Ok(Self {
            frame,
            png_path: settings.png_path.as_ref().map(PathBuf::from),
            settings,
            started: None,
        })
    }

    /// Write every frame to `path` as PNG.
    pub fn with_png_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.png_path = Some(path.into());
        self
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    fn row_height(&self) -> f32 {
        self.settings.row_height.max(1) as f32
    }

    /// Row size relative to the base layout
    fn unit(&self) -> f32 {
        self.row_height() / BASE_ROW_HEIGHT
    }

    /// Pixel height needed for `rows` rows and `log_lines` log lines
    pub fn content_height(&self, rows: usize, round: u32, log_lines: usize) -> f32 {
        let unit = self.unit();
        let pad = BASE_PADDING * unit;
        let mut height = pad;
        if round > 0 {
            height += BASE_ROUND_STRIP * unit + pad;
        }
        height += rows as f32 * (self.row_height() + pad);
        height += log_lines as f32 * (BASE_LOG_LINE * unit + pad / 2.0);
        height
    }

    fn write_png(&self) {
        let Some(path) = &self.png_path else {
            return;
        };
        if let Err(e) = self.frame.save_png(path) {
            warn!(path = %path.display(), error = %e, "Failed to write overlay frame");
        }
    }

    fn draw_round_strip(&mut self, x: f32, y: f32, width: f32, round: u32) {
        let unit = self.unit();
        let ticks = round.min(MAX_ROUND_TICKS);
        let tick_w = width / MAX_ROUND_TICKS as f32;
        for i in 0..ticks {
            self.frame.fill_rect(
                x + i as f32 * tick_w,
                y,
                (tick_w - unit).max(1.0),
                BASE_ROUND_STRIP * unit,
                fade(colors::turn_indicator(), 0.7),
            );
        }
    }

    fn draw_log_line(&mut self, x: f32, y: f32, width: f32, line: &str, age: usize) {
        let unit = self.unit();
        // Older lines fade out
        let alpha = 1.0 / (age as f32 + 1.0);
        let len = line.chars().count() as f32 * 4.0 * unit;
        self.frame.fill_rounded_rect(
            x,
            y,
            len.min(width),
            BASE_LOG_LINE * unit,
            2.0 * unit,
            fade(colors::white(), 0.5 * alpha),
        );
    }
}

impl EffectRenderer for CombatOverlay {
    fn render(&mut self, view: &OverlayView<'_>) {
        let started = *self.started.get_or_insert(view.now);
        let pulse = pulse_phase(view.now.saturating_duration_since(started));

        let content_height =
            self.content_height(view.slots.len(), view.round, view.log_lines.len());
        let width = self.settings.width.max(1);
        if let Err(e) = self
            .frame
            .set_size(width, content_height.ceil().max(1.0) as u32)
        {
            warn!(error = %e, "Failed to resize overlay frame");
            return;
        }

        self.frame.begin_frame(content_height);

        let unit = self.unit();
        let pad = BASE_PADDING * unit;
        let row_h = self.row_height();
        let inner_w = width as f32 - 2.0 * pad;
        let mut y = pad;

        if view.round > 0 {
            self.draw_round_strip(pad, y, inner_w, view.round);
            y += BASE_ROUND_STRIP * unit + pad;
        }

        for slot in view.slots {
            CombatRow::from_slot(slot, view.now).render(
                &mut self.frame,
                pad,
                y,
                inner_w,
                row_h,
                pulse,
            );
            y += row_h + pad;
        }

        for (age, line) in view.log_lines.iter().enumerate() {
            self.draw_log_line(pad, y, inner_w, line, age);
            y += BASE_LOG_LINE * unit + pad / 2.0;
        }

        self.frame.end_frame();
        self.write_png();
    }

    fn clear(&mut self) {
        self.started = None;
        self.frame.clear();
        self.frame.end_frame();
        self.write_png();
    }
}
