//! Inline range annotations on text content.
//!
//! Ranges are half-open `[start, end)` char offsets. The invariant maintained
//! by [`apply`] and [`remove`] is that marks of the same [`MarkType`] never
//! overlap: same-parameter marks that overlap or touch are unioned, and marks
//! carrying a different parameter (another link target, another color) are
//! cut around the newly applied range.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// One inline annotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub range: Range<usize>,
    pub kind: MarkKind,
}

impl Mark {
    pub fn new(range: Range<usize>, kind: MarkKind) -> Self {
        Self { range, kind }
    }
}

/// What a mark does, with its parameter where it has one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "param", rename_all = "snake_case")]
pub enum MarkKind {
    Bold,
    Italic,
    Strikethrough,
    Keyboard,
    /// External URL.
    Link(String),
    /// Reference to another object, decorated with its name at render time.
    Mention(ObjectId),
    TextColor(String),
    BackgroundColor(String),
}

/// Parameter-free discriminant of [`MarkKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkType {
    Bold,
    Italic,
    Strikethrough,
    Keyboard,
    Link,
    Mention,
    TextColor,
    BackgroundColor,
}

impl MarkKind {
    pub fn mark_type(&self) -> MarkType {
        match self {
            MarkKind::Bold => MarkType::Bold,
            MarkKind::Italic => MarkType::Italic,
            MarkKind::Strikethrough => MarkType::Strikethrough,
            MarkKind::Keyboard => MarkType::Keyboard,
            MarkKind::Link(_) => MarkType::Link,
            MarkKind::Mention(_) => MarkType::Mention,
            MarkKind::TextColor(_) => MarkType::TextColor,
            MarkKind::BackgroundColor(_) => MarkType::BackgroundColor,
        }
    }
}

/// Apply `mark` to `marks`, returning the normalized result.
///
/// Empty ranges are ignored.
pub fn apply(marks: &[Mark], mark: Mark) -> Vec<Mark> {
    if mark.range.is_empty() {
        return marks.to_vec();
    }
    let target = mark.kind.mark_type();

    let mut out = Vec::with_capacity(marks.len() + 1);
    let mut same: Vec<Range<usize>> = vec![mark.range.clone()];

    for existing in marks {
        if existing.kind.mark_type() != target {
            out.push(existing.clone());
        } else if existing.kind == mark.kind {
            same.push(existing.range.clone());
        } else {
            out.extend(cut(existing, &mark.range));
        }
    }

    same.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(same.len());
    for range in same {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    out.extend(merged.into_iter().map(|range| Mark::new(range, mark.kind.clone())));

    sort(&mut out);
    out
}

/// Remove every mark of `kind` from `range`, splitting marks that straddle it.
pub fn remove(marks: &[Mark], kind: MarkType, range: Range<usize>) -> Vec<Mark> {
    if range.is_empty() {
        return marks.to_vec();
    }
    let mut out: Vec<Mark> = marks
        .iter()
        .flat_map(|m| {
            if m.kind.mark_type() == kind {
                cut(m, &range)
            } else {
                vec![m.clone()]
            }
        })
        .collect();
    sort(&mut out);
    out
}

/// Split marks at char offset `index`.
///
/// Returns the marks of `[0, index)` and the marks of `[index, ..)` with the
/// latter re-based to start at zero. A mark straddling `index` lands in both.
pub fn split_at(marks: &[Mark], index: usize) -> (Vec<Mark>, Vec<Mark>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    for mark in marks {
        if mark.range.start < index {
            head.push(Mark::new(mark.range.start..mark.range.end.min(index), mark.kind.clone()));
        }
        if mark.range.end > index {
            let start = mark.range.start.max(index) - index;
            tail.push(Mark::new(start..mark.range.end - index, mark.kind.clone()));
        }
    }
    (head, tail)
}

/// Marks of `first` followed by the marks of `second` shifted by `offset`
/// (the char length of the first text), normalized.
pub fn concat(first: &[Mark], second: &[Mark], offset: usize) -> Vec<Mark> {
    second.iter().fold(first.to_vec(), |acc, mark| {
        let shifted = mark.range.start + offset..mark.range.end + offset;
        apply(&acc, Mark::new(shifted, mark.kind.clone()))
    })
}

/// The pieces of `mark` lying outside `range`.
fn cut(mark: &Mark, range: &Range<usize>) -> Vec<Mark> {
    let r = &mark.range;
    if r.end <= range.start || range.end <= r.start {
        return vec![mark.clone()];
    }
    let mut pieces = Vec::with_capacity(2);
    if r.start < range.start {
        pieces.push(Mark::new(r.start..range.start, mark.kind.clone()));
    }
    if range.end < r.end {
        pieces.push(Mark::new(range.end..r.end, mark.kind.clone()));
    }
    pieces
}

fn sort(marks: &mut [Mark]) {
    marks.sort_by(|a, b| {
        (a.range.start, a.range.end, a.kind.mark_type())
            .cmp(&(b.range.start, b.range.end, b.kind.mark_type()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(range: Range<usize>, url: &str) -> Mark {
        Mark::new(range, MarkKind::Link(url.to_string()))
    }

    #[test]
    fn test_apply_unions_touching_same_kind() {
        let marks = vec![Mark::new(0..3, MarkKind::Bold)];
        let out = apply(&marks, Mark::new(3..6, MarkKind::Bold));
        assert_eq!(out, vec![Mark::new(0..6, MarkKind::Bold)]);
    }

    #[test]
    fn test_apply_bridges_two_existing_marks() {
        let marks = vec![
            Mark::new(0..2, MarkKind::Italic),
            Mark::new(6..9, MarkKind::Italic),
        ];
        let out = apply(&marks, Mark::new(1..7, MarkKind::Italic));
        assert_eq!(out, vec![Mark::new(0..9, MarkKind::Italic)]);
    }

    #[test]
    fn test_apply_keeps_other_types_untouched() {
        let marks = vec![Mark::new(0..4, MarkKind::Bold)];
        let out = apply(&marks, Mark::new(2..6, MarkKind::Italic));
        assert_eq!(
            out,
            vec![Mark::new(0..4, MarkKind::Bold), Mark::new(2..6, MarkKind::Italic)]
        );
    }

    #[test]
    fn test_apply_cuts_different_parameter() {
        let marks = vec![link(0..10, "a.com")];
        let out = apply(&marks, link(3..5, "b.com"));
        assert_eq!(
            out,
            vec![link(0..3, "a.com"), link(3..5, "b.com"), link(5..10, "a.com")]
        );
    }

    #[test]
    fn test_apply_ignores_empty_range() {
        let marks = vec![Mark::new(0..2, MarkKind::Bold)];
        assert_eq!(apply(&marks, Mark::new(4..4, MarkKind::Bold)), marks);
    }

    #[test]
    fn test_remove_splits_straddling_mark() {
        let marks = vec![link(0..10, "a.com"), Mark::new(0..10, MarkKind::Bold)];
        let out = remove(&marks, MarkType::Link, 4..6);
        assert_eq!(
            out,
            vec![
                link(0..4, "a.com"),
                Mark::new(0..10, MarkKind::Bold),
                link(6..10, "a.com"),
            ]
        );
    }

    #[test]
    fn test_mark_json_shape() {
        let mark = Mark::new(1..3, MarkKind::Mention(ObjectId::new("obj")));
        let json = serde_json::to_value(&mark).unwrap();
        assert_eq!(json["kind"]["type"], "mention");
        assert_eq!(json["kind"]["param"], "obj");
        assert_eq!(json["range"]["start"], 1);
        let back: Mark = serde_json::from_value(json).unwrap();
        assert_eq!(back, mark);
    }

    #[test]
    fn test_split_at_straddling_mark() {
        let marks = vec![Mark::new(1..5, MarkKind::Bold), Mark::new(6..8, MarkKind::Italic)];
        let (head, tail) = split_at(&marks, 3);
        assert_eq!(head, vec![Mark::new(1..3, MarkKind::Bold)]);
        assert_eq!(
            tail,
            vec![Mark::new(0..2, MarkKind::Bold), Mark::new(3..5, MarkKind::Italic)]
        );
    }

    #[test]
    fn test_concat_shifts_and_joins_touching_marks() {
        let first = vec![Mark::new(0..3, MarkKind::Bold)];
        let second = vec![Mark::new(0..2, MarkKind::Bold), Mark::new(2..4, MarkKind::Italic)];
        assert_eq!(
            concat(&first, &second, 3),
            vec![Mark::new(0..5, MarkKind::Bold), Mark::new(5..7, MarkKind::Italic)]
        );
    }
}
