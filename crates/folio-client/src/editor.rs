//! The editor: single owner of one open document.
//!
//! ```text
//!   Intent ──► Editor::handle ──┬─► optimistic tree update (reduce)
//!                               ├─► Command ──► CommandSink (sync layer)
//!                               └─► rerender ──► views
//!
//!   DocEvent batch ──► Editor::apply_events ──► stores / reduce ──► rerender
//! ```
//!
//! Every mutation of the tree and of the ephemeral state (focus, selection,
//! toggles, mode) goes through `&mut self`, so a single task owns the
//! document. Text edits land in the tree immediately and are re-rendered on
//! every keystroke; only the outgoing `UpdateText` is debounced.
//!
//! Commands are fire-and-forget. A sink failure is logged and the optimistic
//! local state stays as it is; reconciling belongs to the sync layer, which
//! answers with events.

use std::collections::BTreeSet;
use std::ops::Range;

use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use folio_render::{
    Cursor, EditorMode, Focus, NOTE_TITLE_ID, RenderContext, ToggleSet, UrlBuilder, ViewItem,
    render_document,
};
use folio_tree::{BlockTree, DocEvent, TextChange, reduce};
use folio_types::marks::{self, MarkType};
use folio_types::{
    Align, Block, BlockId, Content, Mark, MarkKind, ObjectDetails, ObjectId, TextContent,
    TextStyle, keys,
};

use crate::command::{Command, CommandSink, Position};
use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use crate::error::{EditorError, PolicyViolation};
use crate::intent::{Intent, Prototype};
use crate::stores::{DetailsStore, RelationStore};

/// Drop offsets below this land above the target.
pub const MOVE_TOP_RATIO: f32 = 0.25;
/// Drop offsets above this land below the target.
pub const MOVE_BOTTOM_RATIO: f32 = 0.75;

/// Map a vertical drop offset to a position. Negative offsets have no
/// meaning and map to `None`.
pub fn position_for_ratio(ratio: f32) -> Option<Position> {
    if ratio.is_nan() || ratio < 0.0 {
        None
    } else if ratio < MOVE_TOP_RATIO {
        Some(Position::Top)
    } else if ratio <= MOVE_BOTTOM_RATIO {
        Some(Position::Inner)
    } else {
        Some(Position::Bottom)
    }
}

/// Text waiting for the debounce window to close.
#[derive(Clone, Debug, PartialEq)]
enum PendingText {
    Block { text: String, marks: Vec<Mark> },
    Title(String),
}

pub struct Editor<S> {
    context: ObjectId,
    root: BlockId,
    tree: BlockTree,
    views: Vec<ViewItem>,
    mode: EditorMode,
    focus: Focus,
    /// Text selection inside one block, used by markup actions.
    selection: Option<(BlockId, Range<usize>)>,
    toggles: ToggleSet,
    multi_select: BTreeSet<BlockId>,
    details: DetailsStore,
    relations: RelationStore,
    urls: UrlBuilder,
    config: EditorConfig,
    /// Keyed by block id; the document title is keyed by the root id.
    pending: Debouncer<BlockId, PendingText>,
    sink: S,
    closed: bool,
}

impl<S: CommandSink> Editor<S> {
    pub fn new(
        context: ObjectId,
        config: EditorConfig,
        details: DetailsStore,
        relations: RelationStore,
        sink: S,
    ) -> Self {
        let root = BlockId::new(context.as_str());
        Self {
            context,
            root,
            tree: BlockTree::new(),
            views: Vec::new(),
            mode: EditorMode::default(),
            focus: Focus::none(),
            selection: None,
            toggles: ToggleSet::new(),
            multi_select: BTreeSet::new(),
            details,
            relations,
            urls: UrlBuilder::new(&config.gateway_url),
            pending: Debouncer::new(config.text_debounce()),
            config,
            sink,
            closed: false,
        }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn context(&self) -> &ObjectId {
        &self.context
    }

    pub fn root(&self) -> &BlockId {
        &self.root
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    /// Current view sequence. Replaced wholesale on every update.
    pub fn views(&self) -> &[ViewItem] {
        &self.views
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn toggles(&self) -> &ToggleSet {
        &self.toggles
    }

    pub fn multi_select(&self) -> &BTreeSet<BlockId> {
        &self.multi_select
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// When the next debounced update falls due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.next_deadline()
    }

    pub fn has_pending_text(&self) -> bool {
        !self.pending.is_empty()
    }

    // ========================================================================
    // Incoming events
    // ========================================================================

    /// Apply one batch of events from the sync layer, then re-render once.
    pub fn apply_events(&mut self, events: &[DocEvent]) -> Result<(), EditorError> {
        self.ensure_open()?;
        for event in events {
            match event {
                DocEvent::ShowObject { root, details, relations, .. } => {
                    if *root != self.root {
                        warn!(%root, context = %self.context, "show_object for another document, ignoring");
                        continue;
                    }
                    self.details.merge_all(details);
                    self.relations.merge(relations.iter().cloned());
                    self.tree = reduce(&self.tree, event);
                    if self.tree.children_of(&self.root).is_empty() {
                        self.focus = Focus::on(self.root.clone(), Some(Cursor::End));
                    }
                }
                DocEvent::UpdateDetails { target, details } => {
                    self.details.merge(target.clone(), details);
                }
                DocEvent::UnsetDetails { target, keys } => self.details.unset(target, keys),
                DocEvent::SetRelations { relations } => self.relations.merge(relations.iter().cloned()),
                DocEvent::RemoveRelations { keys } => self.relations.remove(keys),
                _ => self.tree = reduce(&self.tree, event),
            }
        }
        self.prune_ephemeral();
        for problem in self.tree.integrity_errors() {
            debug!(context = %self.context, %problem, "tree integrity");
        }
        self.rerender();
        Ok(())
    }

    // ========================================================================
    // Intents
    // ========================================================================

    pub fn handle(&mut self, intent: Intent) -> Result<(), EditorError> {
        self.ensure_open()?;
        debug!(intent = intent.name(), "handling intent");
        match intent {
            Intent::Focus { id, cursor } => self.set_focus(id, cursor),
            Intent::ClearFocus => {
                self.focus = Focus::none();
                self.selection = None;
                self.rerender();
                Ok(())
            }
            Intent::SelectionChanged { id, range } => {
                self.selection = Some((id, range));
                Ok(())
            }
            Intent::TextChanged { id, text, marks } => self.text_changed(id, text, marks),
            Intent::TitleChanged { text } => self.title_changed(text),
            Intent::SplitLine { id, index } => self.split_line(id, index),
            Intent::EnterAtEnd { id } => self.enter_at_end(id),
            Intent::EnterAtEndOfTitle => self.enter_at_end_of_title(),
            Intent::BackspaceAtStart { id } => self.backspace_at_start(id),
            Intent::ApplyMarkup { kind } => self.apply_markup(kind),
            Intent::AddLink { id, url, range } => self.add_link(id, url, range),
            Intent::RemoveLink { id, range } => self.remove_link(id, range),
            Intent::CreateBlock { target, position, prototype } => {
                self.create_block(target, position, prototype).map(drop)
            }
            Intent::AddBlock { prototype } => {
                let target = self.focused_id()?;
                self.create_block(target, Position::Bottom, prototype).map(drop)
            }
            Intent::Duplicate { id } => self.duplicate(id),
            Intent::CheckboxClicked { id } => self.checkbox_clicked(id),
            Intent::ToggleClicked { id } => self.toggle_clicked(id),
            Intent::TogglePlaceholderClicked { id } => self.toggle_placeholder_clicked(id),
            Intent::UpdateStyle { targets, style } => self.update_style(targets, style),
            Intent::UpdateColor { targets, color } => self.update_color(targets, color),
            Intent::UpdateBackground { targets, color } => self.update_background(targets, color),
            Intent::UpdateAlignment { targets, align } => self.update_alignment(targets, align),
            Intent::OutsideClick => self.outside_click(),
            Intent::SetLocked { locked } => self.set_locked(locked),
            Intent::EnterSelectMode => self.enter_select_mode(),
            Intent::ExitSelectMode => self.exit_select_mode(),
            Intent::ToggleSelect { id } => self.toggle_select(id),
            Intent::SelectAll => self.select_all(),
            Intent::DeleteSelected => self.delete_selected(),
            Intent::CopySelected => self.copy_selected(),
            Intent::EnterScrollAndMove => self.enter_scroll_and_move(),
            Intent::ExitScrollAndMove => self.exit_scroll_and_move(),
            Intent::ApplyScrollAndMove { target, ratio } => self.apply_scroll_and_move(target, ratio),
            Intent::EnterStyling { id } => self.enter_styling(id),
            Intent::EnterMultiStyling => self.enter_multi_styling(),
            Intent::ExitStyling => self.exit_styling(),
            Intent::Undo => {
                self.flush_pending();
                self.dispatch(Command::Undo { context: self.context.clone() });
                Ok(())
            }
            Intent::Redo => {
                self.flush_pending();
                self.dispatch(Command::Redo { context: self.context.clone() });
                Ok(())
            }
            Intent::Copy { range } => self.copy(range),
            Intent::Paste { range } => self.paste(range),
            Intent::Close => self.close(),
        }
    }

    /// Send every update whose debounce window has closed by `now`.
    pub fn flush_due(&mut self, now: Instant) {
        for (id, pending) in self.pending.take_due(now) {
            self.emit_pending(id, pending);
        }
    }

    /// Send every pending update right away.
    pub fn flush_pending(&mut self) {
        for (id, pending) in self.pending.drain() {
            self.emit_pending(id, pending);
        }
    }

    /// Flush, stop accepting intents and release the document.
    pub fn close(&mut self) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.flush_pending();
        self.closed = true;
        self.tree = BlockTree::new();
        self.views.clear();
        self.focus = Focus::none();
        self.selection = None;
        self.toggles = ToggleSet::new();
        self.multi_select.clear();
        if self.config.clear_stores_on_close {
            self.details.clear();
            self.relations.clear();
        }
        debug!(context = %self.context, "editor closed");
        Ok(())
    }

    // ── Focus ───────────────────────────────────────────────────────────────

    fn set_focus(&mut self, id: BlockId, cursor: Option<Cursor>) -> Result<(), EditorError> {
        if !matches!(self.mode, EditorMode::Edit | EditorMode::StyleSingle(_)) {
            return Err(EditorError::WrongMode(self.mode.name()));
        }
        if id != self.root && !self.tree.contains(&id) {
            return Err(EditorError::UnknownBlock(id));
        }
        if !self.focus.is(&id) {
            self.selection = None;
        }
        self.focus = Focus::on(id, cursor);
        self.rerender();
        Ok(())
    }

    fn focused_id(&self) -> Result<BlockId, EditorError> {
        self.focus.id.clone().ok_or(EditorError::NoFocus)
    }

    // ── Text ────────────────────────────────────────────────────────────────

    fn text_changed(&mut self, id: BlockId, text: String, marks: Vec<Mark>) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.text_content(&id)?;
        let marks: Vec<Mark> = marks.into_iter().filter(|m| !m.range.is_empty()).collect();
        let change = TextChange::text(text.clone()).with_marks(marks.clone());
        self.tree = reduce(&self.tree, &DocEvent::text_change(id.clone(), change));
        self.pending.push(id, PendingText::Block { text, marks }, Instant::now());
        self.rerender();
        Ok(())
    }

    fn title_changed(&mut self, text: String) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let name = ObjectDetails::new().with(keys::NAME, text.clone());
        self.details.merge(self.context.clone(), &name);
        self.pending.push(self.root.clone(), PendingText::Title(text), Instant::now());
        self.rerender();
        Ok(())
    }

    fn split_line(&mut self, id: BlockId, index: usize) -> Result<(), EditorError> {
        self.ensure_editable()?;
        if id == self.root {
            debug!("split on the title ignored");
            return Ok(());
        }
        let content = self.text_content(&id)?.clone();
        self.flush_pending();

        let index = index.min(content.char_len());
        let head: String = content.text.chars().take(index).collect();
        let tail: String = content.text.chars().skip(index).collect();
        let (head_marks, tail_marks) = marks::split_at(&content.marks, index);
        let style = continuation_style(content.style);

        let new_id = new_block_id();
        let mut block = Prototype::Text { style }.build(new_id.clone());
        if let Some(text) = block.content.as_text_mut() {
            text.text = tail;
            text.marks = tail_marks;
        }

        let head_change = TextChange::text(head).with_marks(head_marks);
        self.tree = reduce(&self.tree, &DocEvent::text_change(id.clone(), head_change));
        self.insert_block(&id, Position::Bottom, block)?;
        self.dispatch(Command::Split {
            context: self.context.clone(),
            target: id,
            index,
            new_block: new_id.clone(),
            style,
        });
        self.focus = Focus::on(new_id, Some(Cursor::Start));
        self.rerender();
        Ok(())
    }

    fn enter_at_end(&mut self, id: BlockId) -> Result<(), EditorError> {
        if id == self.root {
            return self.enter_at_end_of_title();
        }
        self.ensure_editable()?;
        let content = self.text_content(&id)?.clone();
        if content.is_list() && content.is_empty() {
            return self.update_style(vec![id], TextStyle::Paragraph);
        }
        let style = continuation_style(content.style);
        self.create_block(id, Position::Bottom, Prototype::Text { style }).map(drop)
    }

    fn enter_at_end_of_title(&mut self) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let (target, position) = match self.tree.children_of(&self.root).first() {
            Some(first) => (first.clone(), Position::Top),
            None => (self.root.clone(), Position::Inner),
        };
        self.create_block(target, position, Prototype::paragraph()).map(drop)
    }

    /// Backspace at offset 0: an empty block is unlinked, a non-empty one is
    /// merged into the previous text block.
    fn backspace_at_start(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.ensure_editable()?;
        if id == self.root {
            return Ok(());
        }
        let content = self.text_content(&id)?.clone();
        let Some(position) = self.views.iter().position(|view| *view.id() == id) else {
            debug!(%id, "backspace on a block that is not rendered");
            return Ok(());
        };
        if position == 0 {
            return Ok(());
        }
        self.flush_pending();

        if content.is_empty() {
            let previous = self.views[..position].iter().rev().find_map(|view| match view {
                ViewItem::Title(title) => Some(title.id.clone()),
                ViewItem::Text(_) | ViewItem::Code(_) => Some(view.id().clone()),
                _ => None,
            });
            self.unlink(vec![id]);
            self.focus = match previous {
                Some(previous) => Focus::on(previous, Some(Cursor::End)),
                None => Focus::none(),
            };
            self.rerender();
            return Ok(());
        }

        let previous = self.views[..position]
            .iter()
            .rev()
            .find(|view| view.is_text_like() || matches!(view, ViewItem::Title(_)))
            .filter(|view| view.is_text_like())
            .map(|view| view.id().clone());
        match previous {
            Some(previous) => self.merge(previous, id, &content),
            None => {
                debug!(%id, "no text block above, merge skipped");
                Ok(())
            }
        }
    }

    fn merge(&mut self, previous: BlockId, target: BlockId, content: &TextContent) -> Result<(), EditorError> {
        let above = self.text_content(&previous)?.clone();
        let previous_length = above.char_len();
        let text = format!("{}{}", above.text, content.text);
        let marks = marks::concat(&above.marks, &content.marks, previous_length);

        let orphans = self.tree.children_of(&target).to_vec();
        let tree = reduce(
            &self.tree,
            &DocEvent::text_change(previous.clone(), TextChange::text(text).with_marks(marks)),
        )
        .remove([&target]);
        let mut children = tree.children_of(&previous).to_vec();
        children.extend(orphans);
        self.tree = tree.set_children(&previous, &children);

        self.dispatch(Command::Merge {
            context: self.context.clone(),
            previous: previous.clone(),
            target,
            previous_length,
        });
        self.focus = Focus::on(previous, Some(Cursor::Range(previous_length..previous_length)));
        self.rerender();
        Ok(())
    }

    fn apply_markup(&mut self, kind: MarkKind) -> Result<(), EditorError> {
        let Some((id, range)) = self.selection.clone() else {
            return Err(EditorError::NoFocus);
        };
        if range.is_empty() {
            debug!(%id, "markup over an empty selection ignored");
            return Ok(());
        }
        let marks = marks::apply(&self.text_content(&id)?.marks, Mark::new(range, kind));
        self.update_marks(id, marks)
    }

    fn add_link(&mut self, id: BlockId, url: String, range: Range<usize>) -> Result<(), EditorError> {
        let marks = marks::apply(&self.text_content(&id)?.marks, Mark::new(range, MarkKind::Link(url)));
        self.update_marks(id, marks)
    }

    fn remove_link(&mut self, id: BlockId, range: Range<usize>) -> Result<(), EditorError> {
        let marks = marks::remove(&self.text_content(&id)?.marks, MarkType::Link, range);
        self.update_marks(id, marks)
    }

    /// Markup is sent at once; it supersedes any pending text for the block.
    fn update_marks(&mut self, id: BlockId, marks: Vec<Mark>) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.tree = reduce(
            &self.tree,
            &DocEvent::text_change(id.clone(), TextChange { marks: Some(marks), ..Default::default() }),
        );
        self.pending.take(&id);
        let content = self.text_content(&id)?.clone();
        self.dispatch(Command::UpdateText {
            context: self.context.clone(),
            target: id,
            text: content.text,
            marks: content.marks,
        });
        self.rerender();
        Ok(())
    }

    // ── Blocks ──────────────────────────────────────────────────────────────

    /// Create an empty block next to (or inside) `target`. Text blocks take
    /// focus.
    fn create_block(
        &mut self,
        target: BlockId,
        position: Position,
        prototype: Prototype,
    ) -> Result<BlockId, EditorError> {
        self.ensure_editable()?;
        if !self.tree.contains(&target) {
            return Err(EditorError::UnknownBlock(target));
        }
        self.flush_pending();

        let id = new_block_id();
        let block = prototype.build(id.clone());
        self.insert_block(&target, position, block.clone())?;
        self.dispatch(Command::Create {
            context: self.context.clone(),
            target,
            position,
            block,
        });
        if prototype.is_text() {
            self.focus = Focus::on(id.clone(), Some(Cursor::Start));
            self.selection = None;
        }
        self.rerender();
        Ok(id)
    }

    /// Put `block` into the tree relative to `target`. Top and Bottom on the
    /// root fall back to Inner.
    fn insert_block(&mut self, target: &BlockId, position: Position, block: Block) -> Result<(), EditorError> {
        let parent = match position {
            Position::Inner => None,
            Position::Top | Position::Bottom => self.tree.parent_of(target).cloned(),
        };
        let (parent, children) = match parent {
            None => {
                let mut children = self.tree.children_of(target).to_vec();
                children.push(block.id.clone());
                (target.clone(), children)
            }
            Some(parent) => {
                let mut children = self.tree.children_of(&parent).to_vec();
                let Some(index) = children.iter().position(|child| child == target) else {
                    return Err(EditorError::UnknownBlock(target.clone()));
                };
                let at = if position == Position::Top { index } else { index + 1 };
                children.insert(at, block.id.clone());
                (parent, children)
            }
        };
        self.tree = self.tree.append([block]).set_children(&parent, &children);
        Ok(())
    }

    fn duplicate(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.block(&id)?;
        self.flush_pending();
        self.dispatch(Command::Duplicate { context: self.context.clone(), target: id });
        Ok(())
    }

    /// Remove blocks and their subtrees locally and tell the sync layer.
    fn unlink(&mut self, targets: Vec<BlockId>) {
        let doomed: Vec<BlockId> = targets
            .iter()
            .flat_map(|target| self.tree.subtree(target))
            .map(|block| block.id.clone())
            .collect();
        self.tree = self.tree.remove(&doomed);
        self.dispatch(Command::Unlink { context: self.context.clone(), targets });
        self.prune_ephemeral();
    }

    fn checkbox_clicked(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let checked = self.text_content(&id)?.toggled_check();
        let change = TextChange { checked: Some(checked), ..Default::default() };
        self.tree = reduce(&self.tree, &DocEvent::text_change(id.clone(), change));
        self.dispatch(Command::UpdateCheckbox { context: self.context.clone(), target: id, checked });
        self.rerender();
        Ok(())
    }

    fn toggle_clicked(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.block(&id)?;
        let expanded = self.toggles.toggle(&id);
        debug!(%id, expanded, "toggle clicked");
        self.rerender();
        Ok(())
    }

    fn toggle_placeholder_clicked(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.block(&id)?;
        self.toggles.expand(id.clone());
        self.create_block(id, Position::Inner, Prototype::paragraph()).map(drop)
    }

    fn update_style(&mut self, targets: Vec<BlockId>, style: TextStyle) -> Result<(), EditorError> {
        self.update_text_field(&targets, TextChange::style(style))?;
        self.dispatch(Command::UpdateStyle { context: self.context.clone(), targets, style });
        self.rerender();
        Ok(())
    }

    fn update_color(&mut self, targets: Vec<BlockId>, color: String) -> Result<(), EditorError> {
        let change = TextChange { color: Some(color.clone()), ..Default::default() };
        self.update_text_field(&targets, change)?;
        self.dispatch(Command::UpdateColor { context: self.context.clone(), targets, color });
        self.rerender();
        Ok(())
    }

    fn update_background(&mut self, targets: Vec<BlockId>, color: String) -> Result<(), EditorError> {
        let change = TextChange { background_color: Some(color.clone()), ..Default::default() };
        self.update_text_field(&targets, change)?;
        self.dispatch(Command::UpdateBackgroundColor { context: self.context.clone(), targets, color });
        self.rerender();
        Ok(())
    }

    fn update_alignment(&mut self, targets: Vec<BlockId>, align: Align) -> Result<(), EditorError> {
        let change = TextChange { align: Some(align), ..Default::default() };
        self.update_text_field(&targets, change)?;
        self.dispatch(Command::UpdateAlignment { context: self.context.clone(), targets, align });
        self.rerender();
        Ok(())
    }

    /// Validate targets, flush, then merge `change` into each of them.
    fn update_text_field(&mut self, targets: &[BlockId], change: TextChange) -> Result<(), EditorError> {
        self.ensure_editable()?;
        if targets.contains(&self.root) {
            return Err(PolicyViolation::TitleStyle.into());
        }
        for target in targets {
            self.block(target)?;
        }
        self.flush_pending();
        for target in targets {
            self.tree = reduce(&self.tree, &DocEvent::text_change(target.clone(), change.clone()));
        }
        Ok(())
    }

    /// Click below the last block: reuse a trailing empty paragraph or add one.
    fn outside_click(&mut self) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let Some(last) = self.tree.children_of(&self.root).last().cloned() else {
            return self.append_paragraph();
        };
        let append = match self.tree.node(&last).map(|block| &block.content) {
            None => Some(true),
            Some(Content::Text(text)) => Some(text.style == TextStyle::Title || !text.is_empty()),
            Some(Content::Link(_) | Content::Bookmark(_) | Content::File(_)) => Some(true),
            Some(_) => None,
        };
        match append {
            Some(true) => self.append_paragraph(),
            Some(false) => {
                self.focus = Focus::on(last, Some(Cursor::End));
                self.rerender();
                Ok(())
            }
            None => {
                debug!(%last, "outside click ignored");
                Ok(())
            }
        }
    }

    fn append_paragraph(&mut self) -> Result<(), EditorError> {
        let root = self.root.clone();
        self.create_block(root, Position::Inner, Prototype::paragraph()).map(drop)
    }

    // ── Modes ───────────────────────────────────────────────────────────────

    fn set_locked(&mut self, locked: bool) -> Result<(), EditorError> {
        self.flush_pending();
        self.mode = if locked { EditorMode::Locked } else { EditorMode::Edit };
        self.focus = Focus::none();
        self.selection = None;
        self.multi_select.clear();
        self.rerender();
        Ok(())
    }

    fn enter_select_mode(&mut self) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.flush_pending();
        self.mode = EditorMode::Select;
        self.multi_select.clear();
        self.focus = Focus::none();
        self.selection = None;
        self.rerender();
        Ok(())
    }

    fn exit_select_mode(&mut self) -> Result<(), EditorError> {
        self.ensure_mode(matches!(self.mode, EditorMode::Select | EditorMode::ScrollAndMove))?;
        self.mode = EditorMode::Edit;
        self.multi_select.clear();
        self.focus = Focus::none();
        self.rerender();
        Ok(())
    }

    fn toggle_select(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::Select)?;
        if id == self.root {
            return Ok(());
        }
        self.block(&id)?;
        if !self.multi_select.remove(&id) {
            self.multi_select.insert(id);
        }
        self.rerender();
        Ok(())
    }

    /// Select every rendered block, or clear the selection if there is one.
    fn select_all(&mut self) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::Select)?;
        if self.multi_select.is_empty() {
            let selectable: Vec<BlockId> = self
                .views
                .iter()
                .map(|view| view.id().clone())
                .filter(|id| *id != self.root && id.as_str() != NOTE_TITLE_ID && self.tree.contains(id))
                .collect();
            self.multi_select.extend(selectable);
        } else {
            self.multi_select.clear();
        }
        self.rerender();
        Ok(())
    }

    fn delete_selected(&mut self) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::Select)?;
        let targets = self.selected_in_order();
        if targets.is_empty() {
            return Ok(());
        }
        self.flush_pending();
        self.multi_select.clear();
        self.unlink(targets);
        self.rerender();
        Ok(())
    }

    fn copy_selected(&mut self) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::Select)?;
        let blocks: Vec<Block> = self
            .selected_in_order()
            .iter()
            .filter_map(|id| self.tree.node(id).cloned())
            .collect();
        self.dispatch(Command::Copy { context: self.context.clone(), blocks, range: None });
        Ok(())
    }

    fn enter_scroll_and_move(&mut self) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::Select)?;
        self.mode = EditorMode::ScrollAndMove;
        self.rerender();
        Ok(())
    }

    fn exit_scroll_and_move(&mut self) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::ScrollAndMove)?;
        self.mode = EditorMode::Select;
        self.rerender();
        Ok(())
    }

    /// Move the selection relative to `target`. Nothing changes locally; the
    /// sync layer answers with structure events.
    fn apply_scroll_and_move(&mut self, target: BlockId, ratio: f32) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::ScrollAndMove)?;
        let Some(position) = position_for_ratio(ratio) else {
            warn!(%target, ratio, "unexpected drop ratio, ignoring");
            return Ok(());
        };
        let block = self.block(&target)?;
        if !block.content.supports_nesting() {
            return Err(PolicyViolation::CannotBeParent.into());
        }
        if self.multi_select.contains(&target) {
            return Err(PolicyViolation::DropInsideItself.into());
        }
        if self.multi_select.iter().any(|moving| self.tree.is_descendant(moving, &target)) {
            return Err(PolicyViolation::MoveParentIntoChild.into());
        }
        let target_context = match &block.content {
            Content::Link(link) if position == Position::Inner => link.target.clone(),
            _ => self.context.clone(),
        };
        let blocks = self.selected_in_order();
        if blocks.is_empty() {
            warn!(%target, "move with an empty selection, ignoring");
            return Ok(());
        }

        self.flush_pending();
        self.multi_select.clear();
        self.mode = EditorMode::Select;
        self.dispatch(Command::Move {
            context: self.context.clone(),
            target_context,
            target,
            blocks,
            position,
        });
        self.rerender();
        Ok(())
    }

    fn enter_styling(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.ensure_editable()?;
        if id == self.root {
            return Err(PolicyViolation::TitleStyle.into());
        }
        self.block(&id)?;
        self.flush_pending();
        self.mode = EditorMode::StyleSingle(id);
        self.rerender();
        Ok(())
    }

    fn enter_multi_styling(&mut self) -> Result<(), EditorError> {
        self.ensure_mode(self.mode == EditorMode::Select)?;
        self.mode = EditorMode::StyleMulti(self.multi_select.clone());
        self.rerender();
        Ok(())
    }

    fn exit_styling(&mut self) -> Result<(), EditorError> {
        self.mode = match &self.mode {
            EditorMode::StyleSingle(_) => EditorMode::Edit,
            EditorMode::StyleMulti(_) => EditorMode::Select,
            other => return Err(EditorError::WrongMode(other.name())),
        };
        self.rerender();
        Ok(())
    }

    // ── Clipboard ───────────────────────────────────────────────────────────

    fn copy(&mut self, range: Range<usize>) -> Result<(), EditorError> {
        let id = self.focused_id()?;
        let block = self.block(&id)?.clone();
        self.flush_pending();
        self.dispatch(Command::Copy {
            context: self.context.clone(),
            blocks: vec![block],
            range: Some(range),
        });
        Ok(())
    }

    fn paste(&mut self, range: Range<usize>) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let focus = self.focused_id()?;
        self.flush_pending();
        self.dispatch(Command::Paste {
            context: self.context.clone(),
            focus,
            range,
            selected: self.selected_in_order(),
        });
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_open(&self) -> Result<(), EditorError> {
        if self.closed { Err(EditorError::Closed) } else { Ok(()) }
    }

    fn ensure_editable(&self) -> Result<(), EditorError> {
        self.ensure_mode(self.mode != EditorMode::Locked)
    }

    fn ensure_mode(&self, allowed: bool) -> Result<(), EditorError> {
        if allowed { Ok(()) } else { Err(EditorError::WrongMode(self.mode.name())) }
    }

    fn block(&self, id: &BlockId) -> Result<&Block, EditorError> {
        self.tree.node(id).ok_or_else(|| EditorError::UnknownBlock(id.clone()))
    }

    fn text_content(&self, id: &BlockId) -> Result<&TextContent, EditorError> {
        self.block(id)?.as_text().ok_or_else(|| EditorError::NotText(id.clone()))
    }

    /// Multi-selection in document order.
    fn selected_in_order(&self) -> Vec<BlockId> {
        self.tree
            .subtree(&self.root)
            .into_iter()
            .map(|block| &block.id)
            .filter(|id| self.multi_select.contains(*id))
            .cloned()
            .collect()
    }

    fn emit_pending(&mut self, id: BlockId, pending: PendingText) {
        let command = match pending {
            PendingText::Block { text, marks } => Command::UpdateText {
                context: self.context.clone(),
                target: id,
                text,
                marks,
            },
            PendingText::Title(title) => Command::UpdateTitle { context: self.context.clone(), title },
        };
        self.dispatch(command);
    }

    fn dispatch(&self, command: Command) {
        let name = command.name();
        match self.sink.dispatch(command) {
            Ok(()) => debug!(command = name, context = %self.context, "command dispatched"),
            Err(err) => warn!(command = name, context = %self.context, "command dispatch failed: {err}"),
        }
    }

    /// Drop ephemeral state that points at blocks no longer in the tree.
    fn prune_ephemeral(&mut self) {
        let tree = &self.tree;
        let root = &self.root;
        let alive = |id: &BlockId| id == root || tree.contains(id);

        if self.focus.id.as_ref().is_some_and(|id| !alive(id)) {
            self.focus = Focus::none();
        }
        if self.selection.as_ref().is_some_and(|(id, _)| !alive(id)) {
            self.selection = None;
        }
        self.multi_select.retain(|id| tree.contains(id));
        let gone: Vec<BlockId> = self.toggles.iter().filter(|id| !tree.contains(id)).cloned().collect();
        for id in &gone {
            self.toggles.collapse(id);
        }
    }

    fn rerender(&mut self) {
        if !self.tree.contains(&self.root) {
            self.views.clear();
            return;
        }
        let details = self.details.snapshot();
        let relations = self.relations.snapshot();
        let ctx = RenderContext {
            tree: &self.tree,
            root: &self.root,
            mode: &self.mode,
            focus: &self.focus,
            toggles: &self.toggles,
            multi_select: &self.multi_select,
            details: &details,
            relations: &relations,
            urls: &self.urls,
            featured_relations_enabled: self.config.featured_relations_enabled,
        };
        self.views = render_document(&ctx);
    }
}

/// Style of the block created by enter: lists continue, everything else
/// starts a paragraph.
fn continuation_style(style: TextStyle) -> TextStyle {
    if style.is_list() { style } else { TextStyle::Paragraph }
}

fn new_block_id() -> BlockId {
    BlockId::new(Uuid::now_v7().to_string())
}
