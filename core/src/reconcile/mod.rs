//! Snapshot reconciliation
//!
//! This module provides:
//! - **Differ** ([`diff`]): projects a combatant into persistent row state and
//!   derives damage/heal events from the HP delta
//! - **Transient cues** ([`transient`]): self-expiring markers and name flashes
//! - **Slots** ([`slots`]): one [`RenderSlot`] per roster position, kept in
//!   step with the snapshot by [`RowReconciler`]
//!
//! ```text
//!   previous ─┐
//!             ├─► RowReconciler::sync ─► diff::reconcile(slot[i], data[i], prev[i])
//!   current ──┘                                  │
//!                                                ├─► Projection (always)
//!                                                └─► TransientMarker + Flash (on HP delta)
//! ```

pub mod diff;
pub mod slots;
pub mod transient;

#[cfg(test)]
mod reconciler_tests;

pub use diff::{IconSet, Projection, StateFlags, StatusIcon, is_low_hp};
pub use slots::{RenderSlot, RowReconciler, SlotEvent, SyncReport};
pub use transient::{Flash, TransientKind, TransientMarker};
