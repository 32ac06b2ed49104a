//! FRAY overlay backends
//!
//! Render targets for the scheduler:
//! - [`CombatOverlay`]: headless tiny-skia pixmap with optional PNG export
//! - [`TextOverlay`]: the same rows as text lines

pub mod frame;
pub mod overlays;
pub mod utils;
pub mod widgets;

pub use frame::{FrameError, OverlayFrame};
pub use overlays::{CombatOverlay, TextOverlay};
