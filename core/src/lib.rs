//! FRAY core: snapshot reconciliation for the combat overlay.
//!
//! ```text
//!  SnapshotSource ──poll──► Scheduler ──sync──► RowReconciler ──► Differ
//!                              │                     │
//!                              │ BattleLog           ▼
//!                              └────────────► EffectRenderer
//! ```
//!
//! The scheduler owns every piece of mutable state (previous snapshot, slot
//! list, battle log) and runs one cycle at a time.

pub mod battle_log;
pub mod context;
pub mod reconcile;
pub mod render;
pub mod scheduler;
pub mod source;

pub use battle_log::BattleLog;
pub use context::{AppConfig, AppConfigExt};
pub use reconcile::{RenderSlot, RowReconciler, SyncReport, TransientKind};
pub use render::{EffectRenderer, NullRenderer, OverlayView};
pub use scheduler::{Scheduler, TickOutcome};
pub use source::{FeedSource, FileSource, HttpSource, SnapshotSource, SourceError};
