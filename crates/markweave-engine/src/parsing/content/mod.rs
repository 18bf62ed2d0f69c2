//! # Content Model
//!
//! The read-only input both engines consume: the document as an indexed array
//! of code points, each carrying its line, column and offset, plus a table of
//! line ranges. Every span in the block and inline engines indexes into such an
//! array, so positions can be recovered for any token without re-scanning.

pub mod chars;
pub mod lines;
pub mod slice;
pub mod span;

use xi_rope::Rope;

pub use lines::{LineRef, lines_with_numbers};
pub use slice::{preview, slice_to_string};
pub use span::{Point, Position, Span};

/// A single code point of the input with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePoint {
    pub ch: char,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// 0-based code-point offset in the document.
    pub offset: usize,
}

/// Index range of one physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    /// End of the line body (line ending excluded).
    pub end: usize,
    /// End including the line ending.
    pub eol_end: usize,
}

/// The indexed code-point array of a document.
#[derive(Debug, Clone, Default)]
pub struct Content {
    points: Vec<NodePoint>,
    lines: Vec<LineRange>,
}

impl Content {
    pub fn new(text: &str) -> Self {
        Self::from_rope(&Rope::from(text))
    }

    /// Builds the code-point array from a rope.
    ///
    /// `U+0000` is replaced with `U+FFFD`.
    pub fn from_rope(rope: &Rope) -> Self {
        let mut points = Vec::with_capacity(rope.len());
        let mut lines = Vec::new();

        for line in lines_with_numbers(rope) {
            let (body, ending) = line.split_ending();
            let start = points.len();
            let mut column = 1;
            for ch in body.chars().chain(ending.chars()) {
                let ch = if ch == '\0' { '\u{FFFD}' } else { ch };
                points.push(NodePoint {
                    ch,
                    line: line.number,
                    column,
                    offset: points.len(),
                });
                column += 1;
            }
            let eol_end = points.len();
            lines.push(LineRange {
                start,
                end: eol_end - ending.chars().count(),
                eol_end,
            });
        }

        Self { points, lines }
    }

    pub fn points(&self) -> &[NodePoint] {
        &self.points
    }

    pub fn lines(&self) -> &[LineRange] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The code point at `index`, if any.
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.points.get(index).map(|p| p.ch)
    }

    pub fn point(&self, index: usize) -> Point {
        point_at(&self.points, index)
    }

    pub fn position(&self, span: Span) -> Position {
        position_of(&self.points, span)
    }
}

/// Location of `index` in `points`; an index one past the end yields the
/// point just after the last code point.
pub fn point_at(points: &[NodePoint], index: usize) -> Point {
    if let Some(p) = points.get(index) {
        return Point {
            line: p.line,
            column: p.column,
            offset: p.offset,
        };
    }
    match points.last() {
        Some(last) if last.ch == '\n' => Point {
            line: last.line + 1,
            column: 1,
            offset: last.offset + 1,
        },
        Some(last) => Point {
            line: last.line,
            column: last.column + 1,
            offset: last.offset + 1,
        },
        None => Point {
            line: 1,
            column: 1,
            offset: 0,
        },
    }
}

/// Source position of a span of `points`.
pub fn position_of(points: &[NodePoint], span: Span) -> Position {
    let start = point_at(points, span.start);
    let end = if span.end > span.start {
        match points.get(span.end - 1) {
            Some(last) if last.ch != '\n' => Point {
                line: last.line,
                column: last.column + 1,
                offset: last.offset + 1,
            },
            _ => point_at(points, span.end),
        }
    } else {
        start
    };
    Position { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_points_and_lines() {
        let content = Content::new("ab\r\nc");
        assert_eq!(content.len(), 5);
        assert_eq!(
            content.lines(),
            &[
                LineRange {
                    start: 0,
                    end: 2,
                    eol_end: 4
                },
                LineRange {
                    start: 4,
                    end: 5,
                    eol_end: 5
                },
            ]
        );
        let c = content.points()[4];
        assert_eq!((c.ch, c.line, c.column, c.offset), ('c', 2, 1, 4));
    }

    #[test]
    fn replaces_nul() {
        let content = Content::new("a\0b");
        assert_eq!(content.char_at(1), Some('\u{FFFD}'));
    }

    #[test]
    fn position_of_span() {
        let content = Content::new("hello\nworld");
        let pos = content.position(Span::new(6, 11));
        assert_eq!(
            pos.start,
            Point {
                line: 2,
                column: 1,
                offset: 6
            }
        );
        assert_eq!(
            pos.end,
            Point {
                line: 2,
                column: 6,
                offset: 11
            }
        );
    }

    #[test]
    fn point_past_trailing_newline_moves_to_next_line() {
        let content = Content::new("a\n");
        assert_eq!(
            content.point(2),
            Point {
                line: 2,
                column: 1,
                offset: 2
            }
        );
    }

    #[test]
    fn empty_content_points_at_origin() {
        let content = Content::new("");
        assert!(content.is_empty());
        assert_eq!(content.point(0).line, 1);
    }
}
