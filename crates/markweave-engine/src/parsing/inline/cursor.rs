use crate::parsing::content::{NodePoint, Span};

/// A window of code points rendered as a `String`, with a map between
/// code-point indices and byte offsets.
///
/// Regex-driven scanners match against `rest(index)` and map the byte length
/// of a match back to a code-point index with `index_after`.
#[derive(Debug, Clone)]
pub struct WindowText {
    span: Span,
    text: String,
    /// Byte offset of each code point, plus one entry for the end.
    offsets: Vec<usize>,
}

impl WindowText {
    pub fn new(points: &[NodePoint], span: Span) -> Self {
        let mut text = String::with_capacity(span.len());
        let mut offsets = Vec::with_capacity(span.len() + 1);
        for p in &points[span.start..span.end] {
            offsets.push(text.len());
            text.push(p.ch);
        }
        offsets.push(text.len());
        Self {
            span,
            text,
            offsets,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The text from code point `index` to the end of the window.
    pub fn rest(&self, index: usize) -> &str {
        &self.text[self.offsets[index - self.span.start]..]
    }

    /// Code-point index reached after `bytes` bytes of `rest(index)`.
    ///
    /// `bytes` must fall on a character boundary, as regex match ends do.
    pub fn index_after(&self, index: usize, bytes: usize) -> usize {
        let target = self.offsets[index - self.span.start] + bytes;
        let k = self.offsets.partition_point(|&o| o < target);
        self.span.start + k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::content::Content;

    #[test]
    fn maps_bytes_back_to_code_points() {
        let content = Content::new("xé<ü>z");
        let window = WindowText::new(content.points(), Span::new(1, 6));
        assert_eq!(window.rest(2), "<ü>z");
        // "<ü>" is 4 bytes but 3 code points
        assert_eq!(window.index_after(2, 4), 5);
        assert_eq!(window.index_after(1, 0), 1);
    }

    #[test]
    fn empty_window() {
        let content = Content::new("ab");
        let window = WindowText::new(content.points(), Span::new(2, 2));
        assert_eq!(window.rest(2), "");
        assert_eq!(window.index_after(2, 0), 2);
    }
}
