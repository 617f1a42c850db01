//! Plain-text outline of a view sequence.
//!
//! One line per item: a marker column (`>` focused, `*` selected), two
//! spaces per indent level, the item kind and id, then the text if any.

use std::fmt::Write;

use folio_render::ViewItem;

pub fn outline(views: &[ViewItem]) -> String {
    let mut out = String::new();
    for view in views {
        let marker = if view.is_focused() {
            '>'
        } else if view.is_selected() {
            '*'
        } else {
            ' '
        };
        let pad = "  ".repeat(view.indent());
        let _ = write!(out, "{marker} {pad}{} {}", view.kind(), view.id());
        match view.text() {
            Some(text) if !text.is_empty() => {
                let _ = writeln!(out, ": {text:?}");
            }
            _ => out.push('\n'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, replay};
    use folio_client::EditorConfig;
    use folio_tree::DocEvent;
    use folio_types::{Block, Content, SmartContent, TextStyle};

    #[test]
    fn test_outline_marks_indent_and_text() {
        let blocks = vec![
            Block::new("page", Content::Smart(SmartContent::default())).with_children(["t"]),
            Block::text("t", "", TextStyle::Toggle).with_children(["c"]),
            Block::text("c", "inside", TextStyle::Paragraph),
        ];
        let session = Session::from_events(vec![DocEvent::ShowObject {
            root: "page".into(),
            blocks,
            details: Default::default(),
            relations: vec![],
        }])
        .unwrap();
        let views = replay(&session, EditorConfig::default()).views;

        // Collapsed toggles hide their children.
        assert_eq!(outline(&views), "  title page\n  toggle t\n");
    }
}
