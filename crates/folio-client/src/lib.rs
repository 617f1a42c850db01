//! Editor orchestrator for folio documents.
//!
//! Owns one open document: applies sync-layer events to the tree, turns user
//! intents into optimistic local edits plus outgoing commands, and keeps the
//! rendered views current.
//!
//! ```text
//!   presentation ── Intent ──► EditorHandle ─┐
//!                                            ▼
//!   sync layer ─── DocEvent batches ──► EditorActor ── Command ──► CommandSink
//!                                            │
//!   presentation ◄── views/focus/mode ── EditorSignals
//! ```
//!
//! [`Editor`] is the synchronous core and can be driven directly (tests,
//! replays). [`spawn_editor`] puts it on a tokio task and adds the debounce
//! timer.

mod actor;
mod command;
mod config;
mod debounce;
mod editor;
mod error;
mod intent;
mod stores;

pub use actor::{EditorHandle, EditorSignals, spawn_editor};
pub use command::{Command, CommandSink, NullSink, Position};
pub use config::{ConfigError, DEFAULT_GATEWAY_URL, DEFAULT_TEXT_DEBOUNCE_MS, EditorConfig};
pub use debounce::Debouncer;
pub use editor::{Editor, MOVE_BOTTOM_RATIO, MOVE_TOP_RATIO, position_for_ratio};
pub use error::{EditorError, PolicyViolation, SinkError};
pub use intent::{Intent, Prototype};
pub use stores::{DetailsStore, RelationStore};
