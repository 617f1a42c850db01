//! Actor wrapper around [`Editor`].
//!
//! ```text
//! ┌──────────────┐  EditorCommand   ┌──────────────────────────────────┐
//! │ EditorHandle │ ───────────────► │ EditorActor (one tokio task)     │
//! │ (Clone+Send) │ ◄─── oneshot ─── │   select! {                      │
//! └──────────────┘                  │     commands  → Editor::handle   │
//!                                   │     events    → apply_events     │
//! sync layer ── Vec<DocEvent> ────► │     deadline  → flush_due        │
//!                                   │   }                              │
//!                                   │   publish → EditorSignals        │
//!                                   └──────────────────────────────────┘
//! ```
//!
//! The two inbound channels are drained in arrival order each; there is no
//! ordering between them. After every message the actor publishes the views,
//! focus, mode and toggle set on `watch` channels; policy violations go out on
//! the toast `broadcast` channel.
//!
//! The task ends on `Intent::Close` or when every handle is dropped. Either
//! way pending text is flushed first.

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use folio_render::{Cursor, EditorMode, ToggleSet, ViewItem};
use folio_tree::DocEvent;
use folio_types::{BlockId, Mark};

use crate::command::CommandSink;
use crate::editor::Editor;
use crate::error::EditorError;
use crate::intent::Intent;

/// Toasts buffered for slow subscribers before they start lagging.
const TOAST_CAPACITY: usize = 16;

// ============================================================================
// Commands (internal)
// ============================================================================

enum EditorCommand {
    Intent {
        intent: Intent,
        reply: oneshot::Sender<Result<(), EditorError>>,
    },
    Views {
        reply: oneshot::Sender<Vec<ViewItem>>,
    },
}

// ============================================================================
// EditorHandle (public, Send + Sync + Clone)
// ============================================================================

/// Cheap handle feeding intents to a running editor.
#[derive(Clone)]
pub struct EditorHandle {
    tx: mpsc::UnboundedSender<EditorCommand>,
}

impl EditorHandle {
    /// Deliver one intent and wait for the editor's verdict.
    pub async fn send(&self, intent: Intent) -> Result<(), EditorError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EditorCommand::Intent { intent, reply })
            .map_err(|_| EditorError::Closed)?;
        rx.await.map_err(|_| EditorError::Closed)?
    }

    /// Current view sequence, after everything queued before this call.
    pub async fn views(&self) -> Result<Vec<ViewItem>, EditorError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EditorCommand::Views { reply })
            .map_err(|_| EditorError::Closed)?;
        rx.await.map_err(|_| EditorError::Closed)
    }

    pub async fn text_changed(
        &self,
        id: impl Into<BlockId>,
        text: impl Into<String>,
        marks: Vec<Mark>,
    ) -> Result<(), EditorError> {
        self.send(Intent::TextChanged { id: id.into(), text: text.into(), marks }).await
    }

    pub async fn focus(&self, id: impl Into<BlockId>, cursor: Option<Cursor>) -> Result<(), EditorError> {
        self.send(Intent::Focus { id: id.into(), cursor }).await
    }

    pub async fn close(&self) -> Result<(), EditorError> {
        self.send(Intent::Close).await
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Signals
// ============================================================================

/// Observable editor state for the presentation layer.
pub struct EditorSignals {
    pub views: watch::Receiver<Vec<ViewItem>>,
    pub focus: watch::Receiver<Option<BlockId>>,
    pub mode: watch::Receiver<EditorMode>,
    pub toggles: watch::Receiver<ToggleSet>,
    /// User-facing messages (rejected moves and similar).
    pub toasts: broadcast::Receiver<String>,
}

struct SignalSenders {
    views: watch::Sender<Vec<ViewItem>>,
    focus: watch::Sender<Option<BlockId>>,
    mode: watch::Sender<EditorMode>,
    toggles: watch::Sender<ToggleSet>,
    toasts: broadcast::Sender<String>,
}

impl SignalSenders {
    fn new<S: CommandSink>(editor: &Editor<S>) -> (Self, EditorSignals) {
        let (views, views_rx) = watch::channel(editor.views().to_vec());
        let (focus, focus_rx) = watch::channel(editor.focus().id.clone());
        let (mode, mode_rx) = watch::channel(editor.mode().clone());
        let (toggles, toggles_rx) = watch::channel(editor.toggles().clone());
        let (toasts, toasts_rx) = broadcast::channel(TOAST_CAPACITY);
        let senders = Self { views, focus, mode, toggles, toasts };
        let signals = EditorSignals {
            views: views_rx,
            focus: focus_rx,
            mode: mode_rx,
            toggles: toggles_rx,
            toasts: toasts_rx,
        };
        (senders, signals)
    }
}

/// Replace the watched value only when it differs, so receivers wake on
/// real changes.
fn publish<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}

// ============================================================================
// EditorActor (internal)
// ============================================================================

struct EditorActor<S> {
    editor: Editor<S>,
    signals: SignalSenders,
}

impl<S: CommandSink> EditorActor<S> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<EditorCommand>,
        mut events: mpsc::UnboundedReceiver<Vec<DocEvent>>,
    ) {
        let mut events_open = true;
        loop {
            let deadline = self.editor.next_deadline();
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!(context = %self.editor.context(), "all editor handles dropped, closing");
                        if let Err(err) = self.editor.close() {
                            warn!("close on shutdown failed: {err}");
                        }
                        break;
                    };
                    self.handle_command(command);
                }
                batch = events.recv(), if events_open => match batch {
                    Some(batch) => {
                        if let Err(err) = self.editor.apply_events(&batch) {
                            warn!(events = batch.len(), "dropping event batch: {err}");
                        }
                    }
                    None => {
                        debug!(context = %self.editor.context(), "event stream ended");
                        events_open = false;
                    }
                },
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.editor.flush_due(Instant::now());
                }
            }
            self.publish();
            if self.editor.is_closed() {
                break;
            }
        }
        debug!(context = %self.editor.context(), "editor actor stopped");
    }

    fn handle_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::Intent { intent, reply } => {
                let result = self.editor.handle(intent);
                if let Err(EditorError::Policy(violation)) = &result {
                    // No subscribers is fine.
                    let _ = self.signals.toasts.send(violation.to_string());
                }
                let _ = reply.send(result);
            }
            EditorCommand::Views { reply } => {
                let _ = reply.send(self.editor.views().to_vec());
            }
        }
    }

    fn publish(&self) {
        publish(&self.signals.views, self.editor.views().to_vec());
        publish(&self.signals.focus, self.editor.focus().id.clone());
        publish(&self.signals.mode, self.editor.mode().clone());
        publish(&self.signals.toggles, self.editor.toggles().clone());
    }
}

// ============================================================================
// Public spawn function
// ============================================================================

/// Move `editor` onto its own task.
///
/// `events` is the sync layer's per-document event stream; each message is
/// one batch, re-rendered once. Must be called from within a tokio runtime.
pub fn spawn_editor<S>(
    editor: Editor<S>,
    events: mpsc::UnboundedReceiver<Vec<DocEvent>>,
) -> (EditorHandle, EditorSignals)
where
    S: CommandSink + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (senders, signals) = SignalSenders::new(&editor);
    let actor = EditorActor { editor, signals: senders };
    tokio::spawn(actor.run(rx, events));
    (EditorHandle { tx }, signals)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::command::{Command, Position};
    use crate::config::EditorConfig;
    use crate::error::PolicyViolation;
    use crate::stores::{DetailsStore, RelationStore};
    use folio_tree::TextChange;
    use folio_types::{Block, Content, ObjectId, SmartContent, TextStyle};

    fn page_editor() -> (Editor<mpsc::UnboundedSender<Command>>, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut editor = Editor::new(
            ObjectId::new("page"),
            EditorConfig::default(),
            DetailsStore::new(),
            RelationStore::new(),
            tx,
        );
        let blocks = vec![
            Block::new("page", Content::Smart(SmartContent::default())).with_children(["p1", "p2"]),
            Block::text("p1", "one", TextStyle::Paragraph),
            Block::text("p2", "two", TextStyle::Paragraph),
        ];
        editor
            .apply_events(&[DocEvent::ShowObject {
                root: BlockId::new("page"),
                blocks,
                details: Default::default(),
                relations: vec![],
            }])
            .unwrap();
        (editor, rx)
    }

    fn text_of(views: &[ViewItem], id: &str) -> Option<String> {
        views
            .iter()
            .find(|view| view.id().as_str() == id)
            .and_then(|view| view.text().map(str::to_string))
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_render_immediately_and_send_once() {
        let (editor, mut commands) = page_editor();
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (handle, _signals) = spawn_editor(editor, events_rx);

        let start = Instant::now();
        handle.text_changed("p1", "o", vec![]).await.unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        handle.text_changed("p1", "on", vec![]).await.unwrap();
        handle.text_changed("p1", "one!", vec![]).await.unwrap();

        let views = handle.views().await.unwrap();
        assert_eq!(text_of(&views, "p1").as_deref(), Some("one!"));
        assert!(commands.try_recv().is_err(), "nothing sent inside the window");

        let command = commands.recv().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(400));
        assert_eq!(
            command,
            Command::UpdateText {
                context: ObjectId::new("page"),
                target: BlockId::new("p1"),
                text: "one!".into(),
                marks: vec![],
            }
        );
        assert!(commands.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_structural_intent_flushes_pending_text_first() {
        let (editor, mut commands) = page_editor();
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (handle, _signals) = spawn_editor(editor, events_rx);

        handle.text_changed("p2", "two and more", vec![]).await.unwrap();
        handle.send(Intent::EnterAtEnd { id: BlockId::new("p2") }).await.unwrap();

        assert_eq!(commands.try_recv().unwrap().name(), "update_text");
        let Command::Create { target, position, .. } = commands.try_recv().unwrap() else {
            panic!("expected create");
        };
        assert_eq!(target, BlockId::new("p2"));
        assert_eq!(position, Position::Bottom);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_and_rejects_later_intents() {
        let (editor, mut commands) = page_editor();
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (handle, _signals) = spawn_editor(editor, events_rx);

        handle.text_changed("p1", "bye", vec![]).await.unwrap();
        handle.close().await.unwrap();

        assert_eq!(commands.try_recv().unwrap().name(), "update_text");
        assert_eq!(handle.focus("p1", None).await, Err(EditorError::Closed));
        assert_eq!(handle.views().await, Err(EditorError::Closed));
        assert!(handle.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_flushes_pending_text() {
        let (editor, mut commands) = page_editor();
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (handle, _signals) = spawn_editor(editor, events_rx);

        handle.text_changed("p1", "unsaved", vec![]).await.unwrap();
        drop(handle);

        let Some(Command::UpdateText { text, .. }) = commands.recv().await else {
            panic!("expected flushed update");
        };
        assert_eq!(text, "unsaved");
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_publish_new_views() {
        let (editor, _commands) = page_editor();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (_handle, mut signals) = spawn_editor(editor, events_rx);

        events_tx
            .send(vec![DocEvent::text_change("p2", TextChange::text("remote"))])
            .unwrap();
        signals.views.changed().await.unwrap();
        assert_eq!(text_of(&signals.views.borrow(), "p2").as_deref(), Some("remote"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_violation_becomes_toast() {
        let (editor, mut commands) = page_editor();
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (handle, mut signals) = spawn_editor(editor, events_rx);

        handle.send(Intent::EnterSelectMode).await.unwrap();
        handle.send(Intent::ToggleSelect { id: BlockId::new("p1") }).await.unwrap();
        handle.send(Intent::EnterScrollAndMove).await.unwrap();
        let result = handle
            .send(Intent::ApplyScrollAndMove { target: BlockId::new("p1"), ratio: 0.5 })
            .await;

        assert_eq!(result, Err(EditorError::Policy(PolicyViolation::DropInsideItself)));
        assert_eq!(
            signals.toasts.recv().await.unwrap(),
            PolicyViolation::DropInsideItself.to_string()
        );
        assert_eq!(*signals.mode.borrow(), EditorMode::ScrollAndMove);
        assert!(commands.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_and_toggle_signals() {
        let blocks = vec![
            Block::new("page", Content::Smart(SmartContent::default())).with_children(["t"]),
            Block::text("t", "toggle", TextStyle::Toggle).with_children(["c"]),
            Block::text("c", "child", TextStyle::Paragraph),
        ];
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut editor = Editor::new(
            ObjectId::new("page"),
            EditorConfig::default(),
            DetailsStore::new(),
            RelationStore::new(),
            tx,
        );
        editor
            .apply_events(&[DocEvent::ShowObject {
                root: BlockId::new("page"),
                blocks,
                details: Default::default(),
                relations: vec![],
            }])
            .unwrap();
        let (_events_tx, events_rx) = mpsc::unbounded_channel();
        let (handle, signals) = spawn_editor(editor, events_rx);

        handle.focus("t", Some(Cursor::End)).await.unwrap();
        handle.send(Intent::ToggleClicked { id: BlockId::new("t") }).await.unwrap();
        handle.views().await.unwrap();

        assert_eq!(*signals.focus.borrow(), Some(BlockId::new("t")));
        assert!(signals.toggles.borrow().is_expanded(&BlockId::new("t")));
        assert!(signals.views.borrow().iter().any(|view| view.id().as_str() == "c"));
    }
}
