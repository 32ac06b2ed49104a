//! Common utility functions for overlay rendering
//!
//! Label formatting is delegated to `fray_types::formatting` so the text and
//! pixmap overlays agree.

use tiny_skia::Color;

pub use fray_types::formatting;

/// Convert [u8; 4] RGBA array to tiny_skia Color
#[inline]
pub fn color_from_rgba(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Same color with its alpha multiplied by `factor` (clamped to 0..=1)
pub fn fade(color: Color, factor: f32) -> Color {
    let mut out = color;
    out.set_alpha((color.alpha() * factor).clamp(0.0, 1.0));
    out
}

/// Linear blend from `a` to `b`
pub fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let lerp = |x: f32, y: f32| x + (y - x) * t;
    Color::from_rgba(
        lerp(a.red(), b.red()),
        lerp(a.green(), b.green()),
        lerp(a.blue(), b.blue()),
        lerp(a.alpha(), b.alpha()),
    )
    .unwrap_or(a)
}

/// Truncate a string to max_chars, adding "..." if truncated
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Goblin", 10), "Goblin");
        assert_eq!(truncate_name("Ancient Red Dragon", 10), "Ancient...");
        assert_eq!(truncate_name("Owlbear #2", 10), "Owlbear #2");
    }

    #[test]
    fn test_fade_and_mix() {
        let red = color_from_rgba([255, 0, 0, 200]);
        let faded = fade(red, 0.5);
        assert!((faded.alpha() - red.alpha() * 0.5).abs() < 1e-6);
        assert_eq!(fade(red, 4.0).alpha(), 1.0);

        let black = color_from_rgba([0, 0, 0, 255]);
        let white = color_from_rgba([255, 255, 255, 255]);
        assert!((mix(black, white, 0.5).red() - 0.5).abs() < 1e-6);
        assert_eq!(mix(black, white, 2.0).green(), 1.0);
    }
}
