//! Line-scoped content views.
//!
//! Block recognizers never touch raw offsets: they consume [`ContentLine`]s,
//! the part of a physical line left over once enclosing containers have
//! stripped their prefixes. Leaf tokens keep their lines until the parse phase,
//! where they are joined into phrasing buffers for the inline engine.

use crate::parsing::content::{
    NodePoint, Span,
    chars::{TAB_STOP, is_space_or_tab},
};

/// The remainder of a physical line after container prefixes.
///
/// # Invariants
///
/// - `start <= first_non_ws <= end <= eol_end`
/// - `partial > 0` only when the code point at `start` is a tab of which
///   some columns were already consumed by a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLine {
    /// Index of the first code point of the remainder.
    pub start: usize,
    /// End of the line body, line ending excluded.
    pub end: usize,
    /// End of the line, line ending included.
    pub eol_end: usize,
    /// Virtual column of `start`, counted from the physical line start.
    pub column: usize,
    /// Columns left of a partially consumed tab at `start`.
    pub partial: usize,
    /// Index of the first non-whitespace code point (`end` when blank).
    pub first_non_ws: usize,
    /// Columns between `start` and `first_non_ws`.
    pub indent: usize,
}

impl ContentLine {
    pub(crate) fn classify(
        points: &[NodePoint],
        start: usize,
        end: usize,
        eol_end: usize,
        column: usize,
        partial: usize,
    ) -> Self {
        let mut i = start;
        let mut col = column;
        while i < end {
            match points[i].ch {
                ' ' => col += 1,
                '\t' if i == start && partial > 0 => col += partial,
                '\t' => col += TAB_STOP - col % TAB_STOP,
                _ => break,
            }
            i += 1;
        }
        Self {
            start,
            end,
            eol_end,
            column,
            partial: if partial > 0 && start < end { partial } else { 0 },
            first_non_ws: i,
            indent: col - column,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.first_non_ws >= self.end
    }

    /// Span from the first non-whitespace code point to the end of the body.
    pub fn trimmed_span(&self) -> Span {
        Span::new(self.first_non_ws, self.end)
    }

    /// Raw text of the remainder.
    pub fn text(&self, points: &[NodePoint]) -> String {
        points[self.start..self.end].iter().map(|p| p.ch).collect()
    }

    /// Text of the remainder with a partially consumed tab expanded to the
    /// spaces it still stands for.
    pub fn materialize(&self, points: &[NodePoint]) -> String {
        if self.partial == 0 {
            return self.text(points);
        }
        let mut out = " ".repeat(self.partial);
        out.extend(points[self.start + 1..self.end].iter().map(|p| p.ch));
        out
    }
}

/// Joins leaf lines into one phrasing buffer.
///
/// Leading whitespace of every line is dropped, line endings between lines
/// are kept, and trailing whitespace of the final line is trimmed. Every
/// point keeps its original location, so inline positions map back into the
/// document.
pub fn phrasing_points(points: &[NodePoint], lines: &[ContentLine]) -> Vec<NodePoint> {
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let last = i + 1 == lines.len();
        if last {
            out.extend_from_slice(&points[trim_end(points, line.trimmed_span())]);
        } else {
            out.extend_from_slice(&points[line.first_non_ws..line.end]);
            out.extend_from_slice(&points[line.end..line.eol_end]);
        }
    }
    out
}

/// Phrasing buffer of a single span with surrounding whitespace trimmed.
pub fn phrasing_span(points: &[NodePoint], span: Span) -> Vec<NodePoint> {
    let mut start = span.start;
    while start < span.end && is_space_or_tab(points[start].ch) {
        start += 1;
    }
    points[trim_end(points, Span::new(start, span.end))].to_vec()
}

fn trim_end(points: &[NodePoint], span: Span) -> std::ops::Range<usize> {
    let mut end = span.end;
    while end > span.start && is_space_or_tab(points[end - 1].ch) {
        end -= 1;
    }
    span.start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::content::Content;

    fn line(content: &Content, index: usize) -> ContentLine {
        let r = content.lines()[index];
        ContentLine::classify(content.points(), r.start, r.end, r.eol_end, 0, 0)
    }

    fn string(points: &[NodePoint]) -> String {
        points.iter().map(|p| p.ch).collect()
    }

    #[test]
    fn classify_measures_tabs_in_columns() {
        let content = Content::new(" \tfoo");
        let l = line(&content, 0);
        assert_eq!(l.first_non_ws, 2);
        assert_eq!(l.indent, 4);
        assert!(!l.is_blank());
    }

    #[test]
    fn blank_line_has_first_non_ws_at_end() {
        let content = Content::new("   \n");
        let l = line(&content, 0);
        assert!(l.is_blank());
        assert_eq!(l.first_non_ws, l.end);
        assert_eq!(l.eol_end, 4);
    }

    #[test]
    fn phrasing_keeps_line_endings_and_trims_edges() {
        let content = Content::new("  foo  \n   bar  ");
        let lines = [line(&content, 0), line(&content, 1)];
        let buf = phrasing_points(content.points(), &lines);
        assert_eq!(string(&buf), "foo  \nbar");
        assert_eq!(buf[6].line, 2);
        assert_eq!(buf[6].column, 4);
    }

    #[test]
    fn materialize_expands_partial_tab() {
        let content = Content::new(">\tcode");
        let r = content.lines()[0];
        let l = ContentLine::classify(content.points(), 1, r.end, r.eol_end, 2, 2);
        assert_eq!(l.materialize(content.points()), "  code");
        assert_eq!(l.indent, 2);
    }
}
