//! Reusable UI widgets for overlays
//!
//! - [`CombatRow`] - One roster row resolved against the clock
//! - [`colors`] - Shared palette

pub mod colors;
mod combat_row;

pub use combat_row::{CombatRow, FlashGlow, Pip};
