use crate::parsing::content::{
    LineRange, NodePoint,
    chars::{TAB_STOP, advance_column, is_space_or_tab},
};

use super::content::ContentLine;

/// What a block hook sees of the current line: the remainder left by the
/// containers matched so far, with access to the underlying code points.
///
/// All methods returning a [`ContentLine`] describe a *new* remainder; the
/// view itself is never mutated.
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    points: &'a [NodePoint],
    line: ContentLine,
}

impl<'a> LineView<'a> {
    /// Classifies a whole physical line.
    pub fn new(points: &'a [NodePoint], range: LineRange) -> Self {
        let line = ContentLine::classify(points, range.start, range.end, range.eol_end, 0, 0);
        Self { points, line }
    }

    pub fn with_line(points: &'a [NodePoint], line: ContentLine) -> Self {
        Self { points, line }
    }

    pub fn points(&self) -> &'a [NodePoint] {
        self.points
    }

    pub fn line(&self) -> ContentLine {
        self.line
    }

    pub fn start(&self) -> usize {
        self.line.start
    }

    pub fn end(&self) -> usize {
        self.line.end
    }

    pub fn first_non_ws(&self) -> usize {
        self.line.first_non_ws
    }

    pub fn indent(&self) -> usize {
        self.line.indent
    }

    pub fn is_blank(&self) -> bool {
        self.line.is_blank()
    }

    /// Code point at `index` if it lies inside the line body.
    pub fn ch(&self, index: usize) -> Option<char> {
        (index < self.line.end).then(|| self.points[index].ch)
    }

    /// First non-whitespace code point.
    pub fn first_char(&self) -> Option<char> {
        self.ch(self.line.first_non_ws)
    }

    /// Length of the run of `ch` starting at `from`.
    pub fn run_length(&self, from: usize, ch: char) -> usize {
        let mut i = from;
        while self.ch(i) == Some(ch) {
            i += 1;
        }
        i - from
    }

    /// Index of the first non-space/tab code point at or after `from`.
    pub fn skip_spaces(&self, from: usize) -> usize {
        let mut i = from;
        while self.ch(i).is_some_and(is_space_or_tab) {
            i += 1;
        }
        i
    }

    /// Raw text from `from` to the end of the body.
    pub fn text_from(&self, from: usize) -> String {
        let from = from.min(self.line.end);
        self.points[from..self.line.end]
            .iter()
            .map(|p| p.ch)
            .collect()
    }

    /// True when only spaces and tabs follow `from`.
    pub fn rest_is_blank(&self, from: usize) -> bool {
        self.skip_spaces(from) >= self.line.end
    }

    /// Virtual column at which the code point at `index` starts.
    pub fn column_at(&self, index: usize) -> usize {
        let mut col = self.line.column;
        for i in self.line.start..index.min(self.line.end) {
            col = self.column_after(i, col);
        }
        col
    }

    /// Consumes up to `n` columns of leading whitespace, splitting a tab if
    /// needed.
    pub fn skip_columns(&self, n: usize) -> ContentLine {
        let target = self.line.column + n;
        let mut i = self.line.start;
        let mut col = self.line.column;
        let mut partial = 0;
        while i < self.line.end && col < target {
            match self.points[i].ch {
                ' ' => {
                    col += 1;
                    i += 1;
                }
                '\t' => {
                    let next = self.column_after(i, col);
                    if next <= target {
                        col = next;
                        i += 1;
                    } else {
                        partial = next - target;
                        col = target;
                        break;
                    }
                }
                _ => break,
            }
        }
        ContentLine::classify(
            self.points,
            i,
            self.line.end,
            self.line.eol_end,
            col,
            partial,
        )
    }

    /// The remainder starting at `index`.
    pub fn advance_to(&self, index: usize) -> ContentLine {
        let index = index.clamp(self.line.start, self.line.end);
        ContentLine::classify(
            self.points,
            index,
            self.line.end,
            self.line.eol_end,
            self.column_at(index),
            0,
        )
    }

    /// An empty remainder at the end of the body.
    pub fn exhausted(&self) -> ContentLine {
        self.advance_to(self.line.end)
    }

    fn column_after(&self, index: usize, col: usize) -> usize {
        if index == self.line.start && self.line.partial > 0 {
            col + self.line.partial
        } else if self.points[index].ch == '\t' {
            col + TAB_STOP - col % TAB_STOP
        } else {
            advance_column(self.points[index].ch, col)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::parsing::content::Content;

    fn view(content: &Content) -> LineView<'_> {
        LineView::new(content.points(), content.lines()[0])
    }

    #[rstest]
    #[case("    code", 4, 4)]
    #[case("\tcode", 4, 1)]
    #[case("  - item", 2, 2)]
    #[case("   ", 3, 3)]
    fn indent_and_first_non_ws(
        #[case] input: &str,
        #[case] indent: usize,
        #[case] first: usize,
    ) {
        let content = Content::new(input);
        let v = view(&content);
        assert_eq!(v.indent(), indent);
        assert_eq!(v.first_non_ws(), first);
    }

    #[test]
    fn skip_columns_splits_tab() {
        let content = Content::new("\tfoo");
        let v = view(&content);
        let rest = v.skip_columns(2);
        assert_eq!(rest.start, 0);
        assert_eq!(rest.column, 2);
        assert_eq!(rest.partial, 2);
        assert_eq!(rest.indent, 2);

        let again = LineView::with_line(content.points(), rest).skip_columns(2);
        assert_eq!(again.start, 1);
        assert_eq!(again.partial, 0);
        assert_eq!(again.indent, 0);
    }

    #[test]
    fn skip_columns_stops_at_content() {
        let content = Content::new(" foo");
        let rest = view(&content).skip_columns(4);
        assert_eq!(rest.start, 1);
        assert_eq!(rest.column, 1);
    }

    #[test]
    fn advance_to_tracks_columns() {
        let content = Content::new(">\tfoo");
        let v = view(&content);
        let rest = v.advance_to(1);
        assert_eq!(rest.column, 1);
        assert_eq!(rest.indent, 3);
        assert_eq!(v.run_length(0, '>'), 1);
        assert_eq!(v.text_from(2), "foo");
    }
}
