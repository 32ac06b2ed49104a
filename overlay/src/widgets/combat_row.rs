//! One roster row: turn indicator, icon bar, name panel, effect strip.
//!
//! The row is built from a [`RenderSlot`] at a given instant, so transient
//! markers and the name flash are already resolved against the clock. Both
//! the pixmap and the text overlay draw from the same row.

use fray_core::reconcile::{RenderSlot, StateFlags, StatusIcon, TransientKind};
use tiny_skia::Color;
use tokio::time::Instant;

use crate::frame::OverlayFrame;
use crate::utils::{fade, mix};
use crate::widgets::colors;

/// One entry in the icon bar, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pip {
    Marker(TransientKind),
    Status(StatusIcon),
    TempHp,
    Concentration,
    LowHp,
}

impl Pip {
    pub fn glyph(&self) -> &'static str {
        match self {
            Pip::Marker(TransientKind::Damage) => "⚡",
            Pip::Marker(TransientKind::Heal) => "❤️‍🩹",
            Pip::Status(StatusIcon::Dead) => "💀",
            Pip::Status(StatusIcon::Unconscious) => "💔",
            Pip::Status(StatusIcon::Incapacitated) => "🌀",
            Pip::TempHp => "🛡️",
            Pip::Concentration => "✨",
            Pip::LowHp => "❤️",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Pip::Marker(TransientKind::Damage) => colors::damage_marker(),
            Pip::Marker(TransientKind::Heal) => colors::heal_marker(),
            Pip::Status(StatusIcon::Dead) => colors::dead(),
            Pip::Status(StatusIcon::Unconscious) => colors::unconscious(),
            Pip::Status(StatusIcon::Incapacitated) => colors::incapacitated(),
            Pip::TempHp => colors::temp_hp(),
            Pip::Concentration => colors::concentration(),
            Pip::LowHp => colors::low_hp(),
        }
    }
}

/// Name highlight in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashGlow {
    pub kind: TransientKind,
    /// 0 at the edges of the animation, 1 at its peak
    pub intensity: f32,
}

/// Everything needed to draw one row.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatRow {
    pub turn_active: bool,
    pub pips: Vec<Pip>,
    pub name: String,
    pub hp: String,
    pub effects: String,
    pub effect_count: usize,
    pub flash: Option<FlashGlow>,
    pub flags: StateFlags,
}

impl CombatRow {
    /// Resolve a slot against the clock.
    ///
    /// Markers come first, newest leftmost, followed by the persistent icons.
    pub fn from_slot(slot: &RenderSlot, now: Instant) -> Self {
        let projection = slot.projection();
        let icons = projection.icons;

        let mut pips: Vec<Pip> = slot.markers_at(now).map(|m| Pip::Marker(m.kind)).collect();
        pips.extend(icons.status.map(Pip::Status));
        if icons.temp_hp {
            pips.push(Pip::TempHp);
        }
        if icons.concentration {
            pips.push(Pip::Concentration);
        }
        if icons.low_hp {
            pips.push(Pip::LowHp);
        }

        Self {
            turn_active: slot.is_turn_active(),
            pips,
            name: projection.name_label.clone(),
            hp: projection.hp_label.clone(),
            effects: projection.effect_label.clone(),
            effect_count: projection.effect_names.len(),
            flash: slot.flash_at(now).map(|f| FlashGlow {
                kind: f.kind,
                intensity: f.intensity(now),
            }),
            flags: projection.flags,
        }
    }

    /// Icon bar as text.
    pub fn glyphs(&self) -> String {
        self.pips.iter().map(Pip::glyph).collect()
    }

    /// Row background after state tinting.
    ///
    /// `pulse` is the 0..=1 phase of the low-HP and unconscious pulse.
    pub fn background(&self, pulse: f32) -> Color {
        let base = colors::row_background();
        let wave = (pulse * std::f32::consts::TAU).sin() * 0.5 + 0.5;

        if self.flags.dead {
            fade(base, 0.45)
        } else if self.flags.unconscious {
            mix(base, colors::unconscious(), 0.15 + 0.25 * wave)
        } else if self.flags.low_hp {
            mix(base, colors::low_hp(), 0.1 + 0.25 * wave)
        } else if self.flags.incapacitated {
            // Desaturate toward mid gray
            mix(base, Color::from_rgba8(110, 110, 110, 220), 0.6)
        } else {
            base
        }
    }

    /// Render the row
    ///
    /// # Arguments
    /// * `frame` - The overlay frame to render to
    /// * `x`, `y` - Top-left corner of the row
    /// * `width`, `height` - Row box
    /// * `pulse` - Pulse phase for low-HP / unconscious animation
    pub fn render(
        &self,
        frame: &mut OverlayFrame,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        pulse: f32,
    ) {
        let pad = (height * 0.12).max(1.0);
        let radius = height * 0.2;
        let dim = if self.flags.dead { 0.5 } else { 1.0 };

        frame.fill_rounded_rect(x, y, width, height, radius, self.background(pulse));
        if self.flags.concentrating {
            frame.stroke_rounded_rect(
                x + 1.0,
                y + 1.0,
                width - 2.0,
                height - 2.0,
                radius,
                2.0,
                fade(colors::concentration(), 0.8),
            );
        }

        // Turn indicator
        let bar_w = (height * 0.15).max(2.0);
        if self.turn_active {
            frame.fill_rect(x, y, bar_w, height, colors::turn_indicator());
        }

        // Icon bar
        let pip_d = height * 0.5;
        let pip_gap = pad;
        let mut cursor = x + bar_w + pad;
        let cy = y + height / 2.0;
        let wave = (pulse * std::f32::consts::TAU).sin() * 0.5 + 0.5;
        for pip in &self.pips {
            let alpha = match pip {
                Pip::LowHp => 0.4 + 0.6 * wave,
                _ => dim,
            };
            frame.fill_circle(cursor + pip_d / 2.0, cy, pip_d / 2.0, fade(pip.color(), alpha));
            cursor += pip_d + pip_gap;
        }

        // Name panel with flash glow
        let name_w = (width * 0.4).min(width - (cursor - x) - pad).max(0.0);
        let panel_y = y + pad;
        let panel_h = height - 2.0 * pad;
        if let Some(glow) = self.flash {
            let color = match glow.kind {
                TransientKind::Damage => colors::damage(),
                TransientKind::Heal => colors::heal(),
            };
            let spread = pad * 2.0 * glow.intensity;
            frame.fill_rounded_rect(
                cursor - spread,
                panel_y - spread,
                name_w + 2.0 * spread,
                panel_h + 2.0 * spread,
                radius + spread,
                fade(color, glow.intensity),
            );
        }
        frame.fill_rounded_rect(
            cursor,
            panel_y,
            name_w,
            panel_h,
            radius,
            fade(colors::name_panel(), dim),
        );
        cursor += name_w + pad;

        // Effect strip: one segment per custom effect
        let strip_w = x + width - pad - cursor;
        if self.effect_count > 0 && strip_w > 0.0 {
            let seg_w = strip_w / self.effect_count as f32;
            for i in 0..self.effect_count {
                frame.fill_rounded_rect(
                    cursor + i as f32 * seg_w,
                    panel_y + panel_h * 0.25,
                    (seg_w - 1.0).max(1.0),
                    panel_h * 0.5,
                    radius * 0.5,
                    fade(colors::effect_strip(), dim),
                );
            }
        }
    }
}
