//! Overlay palette

use tiny_skia::Color;

pub fn transparent() -> Color {
    Color::TRANSPARENT
}

pub fn white() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

pub fn row_background() -> Color {
    Color::from_rgba8(45, 45, 50, 220)
}

pub fn name_panel() -> Color {
    Color::from_rgba8(60, 58, 66, 235)
}

pub fn effect_strip() -> Color {
    Color::from_rgba8(90, 80, 110, 200)
}

pub fn turn_indicator() -> Color {
    Color::from_rgba8(224, 178, 107, 255)
}

// ─────────────────────────────────────────────────────────────────────────────
// Transient cues
// ─────────────────────────────────────────────────────────────────────────────

pub fn damage() -> Color {
    Color::from_rgba8(120, 0, 0, 204)
}

pub fn heal() -> Color {
    Color::from_rgba8(0, 120, 0, 179)
}

pub fn damage_marker() -> Color {
    Color::from_rgba8(255, 214, 10, 255)
}

pub fn heal_marker() -> Color {
    Color::from_rgba8(255, 120, 150, 255)
}

// ─────────────────────────────────────────────────────────────────────────────
// Status icons
// ─────────────────────────────────────────────────────────────────────────────

pub fn dead() -> Color {
    Color::from_rgba8(220, 220, 220, 255)
}

pub fn unconscious() -> Color {
    Color::from_rgba8(200, 40, 80, 255)
}

pub fn incapacitated() -> Color {
    Color::from_rgba8(80, 160, 230, 255)
}

pub fn temp_hp() -> Color {
    Color::from_rgba8(120, 170, 255, 255)
}

pub fn concentration() -> Color {
    Color::from_rgba8(170, 110, 255, 255)
}

pub fn low_hp() -> Color {
    Color::from_rgba8(230, 30, 50, 255)
}
