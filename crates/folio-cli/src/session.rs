//! Recorded editing sessions.
//!
//! A session is the document id plus an ordered list of steps. A step is
//! either one event batch from the sync layer or one user intent.
//!
//! ```json
//! {
//!   "context": "page",
//!   "steps": [
//!     {"events": [{"type": "show_object", "root": "page", "blocks": []}]},
//!     {"intent": {"intent": "text_changed", "id": "p1", "text": "hello"}}
//!   ]
//! }
//! ```
//!
//! Replays drive the synchronous [`Editor`] directly. Pending text is flushed
//! at the end instead of waiting out the debounce window.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::warn;

use folio_client::{Command, DetailsStore, Editor, EditorConfig, Intent, RelationStore};
use folio_render::ViewItem;
use folio_tree::DocEvent;
use folio_types::ObjectId;

#[derive(Debug, Deserialize)]
pub struct Session {
    pub context: ObjectId,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Events(Vec<DocEvent>),
    Intent(Intent),
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading session {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing session {}", path.display()))
    }

    /// A session holding one event batch; the context is taken from its
    /// `show_object`.
    pub fn from_events(events: Vec<DocEvent>) -> Result<Self> {
        let Some(context) = events.iter().find_map(|event| match event {
            DocEvent::ShowObject { root, .. } => Some(ObjectId::new(root.as_str())),
            _ => None,
        }) else {
            bail!("no show_object event in snapshot");
        };
        Ok(Self { context, steps: vec![Step::Events(events)] })
    }

    pub fn load_events(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let events: Vec<DocEvent> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        Self::from_events(events)
    }
}

/// What a replay left behind.
#[derive(Debug)]
pub struct Replay {
    pub views: Vec<ViewItem>,
    pub commands: Vec<Command>,
    /// Step index and message for every step the editor refused.
    pub rejected: Vec<(usize, String)>,
}

pub fn replay(session: &Session, config: EditorConfig) -> Replay {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut editor = Editor::new(
        session.context.clone(),
        config,
        DetailsStore::new(),
        RelationStore::new(),
        tx,
    );

    let mut rejected = Vec::new();
    for (index, step) in session.steps.iter().enumerate() {
        let result = match step {
            Step::Events(batch) => editor.apply_events(batch),
            Step::Intent(intent) => editor.handle(intent.clone()),
        };
        if let Err(err) = result {
            warn!(step = index, "step rejected: {err}");
            rejected.push((index, err.to_string()));
        }
    }
    editor.flush_pending();
    let views = editor.views().to_vec();
    drop(editor);

    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }
    Replay { views, commands, rejected }
}
