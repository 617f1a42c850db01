//! Depth-first projection of a block tree into [`ViewItem`]s.
//!
//! ```text
//!   root ─┬─ p1 (numbered)        →  Title(root)        (synthetic)
//!         ├─ row (layout) ─┬─ a   →  Text(p1, №1)
//!         │                └─ b   →  Text(a)            (layout flattened)
//!         └─ t (toggle) ── t1     →  Text(b)
//!                                    Text(t, toggle)    (t1 only if expanded)
//! ```
//!
//! Rendering is pure: the same [`RenderContext`] always yields the same
//! items. Malformed nodes (dangling child ids, titles for layouts that have
//! no title) are logged and skipped so one bad node never aborts a render.

use std::collections::BTreeSet;

use tracing::{debug, error, warn};

use folio_tree::BlockTree;
use folio_types::{
    Block, BlockId, BookmarkContent, Content, CoverType, FileContent, FileState, FileType,
    LinkContent, ObjectDetails, ObjectId, ObjectLayout, RelationBlockContent, RelationKey,
    SmartKind, TextContent, TextStyle, keys,
};

use crate::focus::Focus;
use crate::mode::EditorMode;
use crate::relations::{DetailsSnapshot, RelationsSnapshot, object_ref, relation_view};
use crate::toggles::ToggleSet;
use crate::urls::UrlBuilder;
use crate::view::{
    BookmarkView, CodeView, Cover, DescriptionView, FileView, ItemFrame, MarkView, NOTE_TITLE_ID,
    PageView, RelationState, RelationView, ResourceState, TextKind, TextView, TitleLayout,
    TitleView, ViewItem,
};

/// Nesting depth at which rendering stops descending. Only reachable through
/// a cyclic tree.
pub const MAX_RENDER_DEPTH: usize = 64;

/// Everything a render reads. All borrowed; nothing is mutated.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub tree: &'a BlockTree,
    /// Root block id; equals the document's object id.
    pub root: &'a BlockId,
    pub mode: &'a EditorMode,
    pub focus: &'a Focus,
    pub toggles: &'a ToggleSet,
    /// Bulk selection (Select / ScrollAndMove modes).
    pub multi_select: &'a BTreeSet<BlockId>,
    pub details: &'a DetailsSnapshot,
    pub relations: &'a RelationsSnapshot,
    pub urls: &'a UrlBuilder,
    pub featured_relations_enabled: bool,
}

/// Render the whole document, header included.
pub fn render_document(ctx: &RenderContext<'_>) -> Vec<ViewItem> {
    render(ctx, ctx.root, 0)
}

/// Render the children of `anchor` at `indent`. Emits the document header
/// when `anchor` is the root.
pub fn render(ctx: &RenderContext<'_>, anchor: &BlockId, indent: usize) -> Vec<ViewItem> {
    let mut out = Vec::new();
    Renderer { ctx }.render_into(anchor, indent, 0, &mut out);
    out
}

struct Renderer<'c, 'a> {
    ctx: &'c RenderContext<'a>,
}

impl Renderer<'_, '_> {
    fn render_into(&self, anchor: &BlockId, indent: usize, depth: usize, out: &mut Vec<ViewItem>) {
        if depth > MAX_RENDER_DEPTH {
            warn!(%anchor, "render depth limit reached, truncating");
            return;
        }
        if anchor == self.ctx.root {
            self.header(out);
        }

        // Position within the current run of numbered siblings.
        let mut number = 0;

        for child in self.ctx.tree.children_of(anchor) {
            let Some(block) = self.ctx.tree.node(child) else {
                warn!(parent = %anchor, %child, "dangling child reference, skipping");
                continue;
            };
            number = match &block.content {
                Content::Text(text) if text.style == TextStyle::Numbered => number + 1,
                _ => 0,
            };
            match &block.content {
                Content::Text(text) => {
                    // A run of numbered siblings ends where a child list starts.
                    if self.text(block, text, indent, depth, number, out) {
                        number = 0;
                    }
                }
                Content::Layout(_) => self.render_into(&block.id, indent, depth + 1, out),
                Content::Bookmark(bookmark) => out.push(self.bookmark(block, bookmark, indent)),
                Content::Divider(divider) => out.push(ViewItem::Divider {
                    id: block.id.clone(),
                    indent,
                    style: divider.style,
                    is_selected: self.is_selected(&block.id),
                }),
                Content::Link(link) => out.push(self.link(block, link, indent)),
                Content::File(file) => out.push(self.file(block, file, indent)),
                Content::RelationBlock(relation) => out.push(self.relation(block, relation, indent)),
                Content::FeaturedRelations => {
                    if let Some(item) = self.featured(block) {
                        out.push(item);
                    }
                }
                Content::Smart(_) => {
                    error!(id = %block.id, parent = %anchor, "root marker nested inside document, skipping");
                }
            }
        }
    }

    // ── Header ──────────────────────────────────────────────────────────────

    fn header(&self, out: &mut Vec<ViewItem>) {
        let root = self.ctx.root;
        let details = self.root_details();

        if self.smart_kind() == SmartKind::Archive || details.is_some_and(ObjectDetails::is_archived) {
            out.push(ViewItem::ArchiveTitle {
                id: root.clone(),
                text: details.and_then(ObjectDetails::name).map(str::to_owned),
            });
            return;
        }

        let has_title_block = self
            .ctx
            .tree
            .any(|block| block.as_text().is_some_and(|text| text.style == TextStyle::Title));
        if has_title_block {
            return;
        }

        if self.layout() == ObjectLayout::Note {
            out.push(ViewItem::NoteTitle { id: BlockId::new(NOTE_TITLE_ID) });
            return;
        }

        let name = details.and_then(ObjectDetails::name).unwrap_or_default();
        let checked = details.is_some_and(ObjectDetails::is_done);
        if let Some(title) = self.title_view(root, name, checked) {
            out.push(ViewItem::Title(title));
        }
    }

    fn title_view(&self, id: &BlockId, text: &str, checked: bool) -> Option<TitleView> {
        let details = self.root_details();
        let emoji = details.and_then(ObjectDetails::icon_emoji).map(str::to_owned);
        let image = details
            .and_then(ObjectDetails::icon_image)
            .map(|hash| self.ctx.urls.thumbnail(hash));

        let layout = match self.layout() {
            ObjectLayout::Basic | ObjectLayout::File | ObjectLayout::Image => {
                TitleLayout::Basic { emoji, image }
            }
            ObjectLayout::Todo => TitleLayout::Todo { checked },
            ObjectLayout::Profile => TitleLayout::Profile { image },
            other => {
                error!(%id, layout = ?other, "layout has no title projection, skipping");
                return None;
            }
        };

        Some(TitleView {
            id: id.clone(),
            text: text.to_owned(),
            layout,
            cover: details.and_then(|d| self.cover(d)),
            mode: self.ctx.mode.item_mode(),
            is_focused: self.ctx.focus.is(id),
            cursor: self.ctx.focus.cursor_for(id, text.chars().count()),
        })
    }

    fn cover(&self, details: &ObjectDetails) -> Option<Cover> {
        let cover_id = details.cover_id()?;
        match details.cover_type() {
            Some(CoverType::Image) | Some(CoverType::Bundled) => {
                Some(Cover::Image(self.ctx.urls.image(cover_id)))
            }
            Some(CoverType::Color) => Some(Cover::Color(cover_id.to_owned())),
            Some(CoverType::Gradient) => Some(Cover::Gradient(cover_id.to_owned())),
            None => {
                debug!(cover_type = ?details.get(keys::COVER_TYPE), "no cover for cover type");
                None
            }
        }
    }

    // ── Text ────────────────────────────────────────────────────────────────

    fn text(
        &self,
        block: &Block,
        text: &TextContent,
        indent: usize,
        depth: usize,
        number: usize,
        out: &mut Vec<ViewItem>,
    ) -> bool {
        let kind = match text.style {
            TextStyle::Title => {
                if let Some(title) =
                    self.title_view(&block.id, &text.text, text.is_checked == Some(true))
                {
                    out.push(ViewItem::Title(title));
                }
                return false;
            }
            TextStyle::Description => {
                let featured = self
                    .root_details()
                    .is_some_and(|details| details.has_featured(keys::DESCRIPTION));
                if featured {
                    out.push(ViewItem::Description(DescriptionView {
                        id: block.id.clone(),
                        text: text.text.clone(),
                        mode: self.ctx.mode.item_mode(),
                        is_focused: self.ctx.focus.is(&block.id),
                        cursor: self.ctx.focus.cursor_for(&block.id, text.char_len()),
                    }));
                }
                return false;
            }
            TextStyle::Code => {
                out.push(ViewItem::Code(CodeView {
                    id: block.id.clone(),
                    text: text.text.clone(),
                    lang: block.fields.lang().map(str::to_owned),
                    color: text.color.clone(),
                    background_color: text.background_color.clone(),
                    indent,
                    mode: self.ctx.mode.item_mode(),
                    is_focused: self.ctx.focus.is(&block.id),
                    cursor: self.ctx.focus.cursor_for(&block.id, text.char_len()),
                    is_selected: self.is_selected(&block.id),
                }));
                return self.nested(block, indent, depth, out);
            }
            TextStyle::Toggle => {
                let expanded = self.ctx.toggles.is_expanded(&block.id);
                out.push(ViewItem::Text(self.text_view(
                    block,
                    text,
                    TextKind::Toggle { expanded, is_empty: !block.has_children() },
                    indent,
                )));
                return expanded && self.nested(block, indent, depth, out);
            }
            TextStyle::Paragraph => TextKind::Paragraph,
            TextStyle::H1 => TextKind::H1,
            TextStyle::H2 => TextKind::H2,
            TextStyle::H3 => TextKind::H3,
            TextStyle::Quote => TextKind::Quote,
            TextStyle::Bulleted => TextKind::Bulleted,
            TextStyle::Numbered => TextKind::Numbered { number },
            TextStyle::Checkbox => TextKind::Checkbox { checked: text.is_checked == Some(true) },
        };
        out.push(ViewItem::Text(self.text_view(block, text, kind, indent)));
        self.nested(block, indent, depth, out)
    }

    /// Children of a text block, one level deeper. Returns whether anything
    /// was recursed into.
    fn nested(&self, block: &Block, indent: usize, depth: usize, out: &mut Vec<ViewItem>) -> bool {
        if !block.has_children() {
            return false;
        }
        self.render_into(&block.id, indent + 1, depth + 1, out);
        true
    }

    fn text_view(&self, block: &Block, text: &TextContent, kind: TextKind, indent: usize) -> TextView {
        TextView {
            id: block.id.clone(),
            kind,
            text: text.text.clone(),
            marks: self.marks(text),
            color: text.color.clone(),
            background_color: text.background_color.clone(),
            align: text.align,
            indent,
            mode: self.ctx.mode.item_mode(),
            is_focused: self.ctx.focus.is(&block.id),
            cursor: self.ctx.focus.cursor_for(&block.id, text.char_len()),
            is_selected: self.is_selected(&block.id),
        }
    }

    fn marks(&self, text: &TextContent) -> Vec<MarkView> {
        use folio_types::MarkKind;

        text.marks
            .iter()
            .map(|mark| {
                let target = match &mark.kind {
                    MarkKind::Mention(object) => Some(object_ref(object, self.ctx.details, self.ctx.urls)),
                    MarkKind::Link(url) => {
                        let object = ObjectId::new(url.clone());
                        self.ctx
                            .details
                            .contains_key(&object)
                            .then(|| object_ref(&object, self.ctx.details, self.ctx.urls))
                    }
                    _ => None,
                };
                MarkView {
                    range: mark.range.clone(),
                    kind: mark.kind.clone(),
                    target,
                }
            })
            .collect()
    }

    // ── Media ───────────────────────────────────────────────────────────────

    fn frame(&self, block: &Block, indent: usize) -> ItemFrame {
        ItemFrame {
            id: block.id.clone(),
            indent,
            mode: self.ctx.mode.item_mode(),
            is_selected: self.is_selected(&block.id),
        }
    }

    fn bookmark(&self, block: &Block, bookmark: &BookmarkContent, indent: usize) -> ViewItem {
        let state = match (&bookmark.url, &bookmark.title, &bookmark.description) {
            (None, _, _) => ResourceState::Placeholder,
            (Some(url), Some(title), Some(description)) => ResourceState::Ready(BookmarkView {
                url: url.clone(),
                title: title.clone(),
                description: description.clone(),
                image_url: bookmark.image.as_deref().map(|hash| self.ctx.urls.image(hash)),
                favicon_url: bookmark.favicon.as_deref().map(|hash| self.ctx.urls.image(hash)),
            }),
            (Some(url), _, _) => ResourceState::Error(Some(url.clone())),
        };
        ViewItem::Bookmark { frame: self.frame(block, indent), state }
    }

    fn file(&self, block: &Block, file: &FileContent, indent: usize) -> ViewItem {
        let state = match (file.state, &file.hash) {
            (FileState::Empty, _) => ResourceState::Placeholder,
            (FileState::Uploading, _) => ResourceState::Uploading,
            (FileState::Error, _) => ResourceState::Error(file.name.clone()),
            (FileState::Done, None) => {
                warn!(id = %block.id, "file marked done without a hash");
                ResourceState::Error(file.name.clone())
            }
            (FileState::Done, Some(hash)) => {
                let url = match file.file_type {
                    FileType::Image => self.ctx.urls.image(hash),
                    FileType::File | FileType::Video | FileType::None => self.ctx.urls.file(hash),
                };
                ResourceState::Ready(FileView {
                    url,
                    name: file.name.clone(),
                    mime: file.mime.clone(),
                    size: file.size,
                })
            }
        };
        ViewItem::File {
            frame: self.frame(block, indent),
            file_type: file.file_type,
            state,
        }
    }

    fn link(&self, block: &Block, link: &LinkContent, indent: usize) -> ViewItem {
        let state = match self.ctx.details.get(&link.target) {
            None => ResourceState::Placeholder,
            Some(target) if target.is_deleted() => {
                ResourceState::Error(Some(link.target.to_string()))
            }
            Some(target) => ResourceState::Ready(PageView {
                name: target.name().map(str::to_owned),
                emoji: target.icon_emoji().map(str::to_owned),
                image: target.icon_image().map(|hash| self.ctx.urls.image(hash)),
                archived: target.is_archived(),
            }),
        };
        ViewItem::Page {
            frame: self.frame(block, indent),
            target: link.target.clone(),
            state,
        }
    }

    // ── Relations ───────────────────────────────────────────────────────────

    fn relation(&self, block: &Block, content: &RelationBlockContent, indent: usize) -> ViewItem {
        let empty = ObjectDetails::new();
        let values = self.root_details().unwrap_or(&empty);

        let view = content
            .key
            .as_ref()
            .filter(|key| !key.is_empty())
            .and_then(|key| self.ctx.relations.get(key))
            .and_then(|relation| relation_view(relation, values, self.ctx.details, self.ctx.urls));

        let state = match view {
            Some(view) => RelationState::Related {
                view,
                background: content.background.clone(),
            },
            None => RelationState::Placeholder,
        };
        ViewItem::Relation { id: block.id.clone(), indent, state }
    }

    fn featured(&self, block: &Block) -> Option<ViewItem> {
        if !self.ctx.featured_relations_enabled {
            return None;
        }
        let details = self.root_details()?;
        let relations: Vec<RelationView> = details
            .featured_relations()
            .iter()
            .filter_map(|key| self.featured_view(details, key))
            .filter(|view| !view.is_empty())
            .collect();
        if relations.is_empty() {
            return None;
        }
        Some(ViewItem::FeaturedRelations { id: block.id.clone(), relations })
    }

    fn featured_view(&self, details: &ObjectDetails, key: &RelationKey) -> Option<RelationView> {
        match key.as_str() {
            keys::DESCRIPTION => None,
            keys::TYPE => {
                let type_id = details.object_type()?;
                let name = self
                    .ctx
                    .details
                    .get(&type_id)
                    .and_then(ObjectDetails::name)
                    .unwrap_or_default()
                    .to_owned();
                Some(RelationView::ObjectType { key: key.clone(), name, type_id })
            }
            _ => {
                let relation = self.ctx.relations.get(key)?;
                relation_view(relation, details, self.ctx.details, self.ctx.urls)
            }
        }
    }

    // ── Root classification ─────────────────────────────────────────────────

    fn root_details(&self) -> Option<&ObjectDetails> {
        self.ctx.details.get(&ObjectId::from(self.ctx.root))
    }

    fn smart_kind(&self) -> SmartKind {
        match self.ctx.tree.node(self.ctx.root).map(|root| &root.content) {
            Some(Content::Smart(smart)) => smart.kind,
            _ => SmartKind::Page,
        }
    }

    /// Layout from root details; falls back by smart kind when absent or unknown.
    fn layout(&self) -> ObjectLayout {
        if let Some(layout) = self.root_details().and_then(ObjectDetails::layout) {
            return layout;
        }
        match self.smart_kind() {
            SmartKind::ProfilePage => ObjectLayout::Profile,
            _ => ObjectLayout::Basic,
        }
    }

    fn is_selected(&self, id: &BlockId) -> bool {
        self.ctx.mode.is_selected(id, self.ctx.multi_select)
    }
}
