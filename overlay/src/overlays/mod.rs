//! Complete overlay implementations
//!
//! Each overlay is an [`EffectRenderer`](fray_core::EffectRenderer) backend
//! that the scheduler drives after every cycle.
//!
//! - [`CombatOverlay`] - headless pixmap, optionally written out as PNG
//! - [`TextOverlay`] - rows as text lines, optionally echoed to a writer

mod combat;
mod text;

pub use combat::CombatOverlay;
pub use text::TextOverlay;

use std::time::Duration;

/// Period of the low-HP and unconscious pulse.
pub const PULSE_PERIOD: Duration = Duration::from_millis(1200);

/// Pulse phase in `0.0..1.0` for `elapsed` time since the overlay started.
pub fn pulse_phase(elapsed: Duration) -> f32 {
    let period = PULSE_PERIOD.as_secs_f32();
    (elapsed.as_secs_f32() % period) / period
}
