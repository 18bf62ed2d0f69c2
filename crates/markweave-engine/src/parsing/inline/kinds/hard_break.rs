use crate::{
    ast::{Node, NodeType, Void, node_type},
    parsing::{
        content::{
            Span,
            chars::{is_escaped, is_line_ending},
        },
        inline::{
            recognizer::{
                DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer, ScanStep, Window,
            },
            types::{Delimiter, InlineToken},
        },
    },
};

/// Hard line breaks: two or more spaces, or a backslash, before a line
/// ending. The token covers the marker and the line ending.
pub struct HardBreak;

impl HardBreak {
    pub const MIN_SPACES: usize = 2;
}

struct HardBreakScanner;

impl DelimiterScanner for HardBreakScanner {
    fn next(&mut self, window: &Window<'_>) -> ScanStep {
        let floor = window.span.start;
        let mut i = floor;
        while let Some(eol) = window.find(i, is_line_ending) {
            let end = match (window.ch(eol), window.ch(eol + 1)) {
                (Some('\r'), Some('\n')) if eol + 1 < window.span.end => eol + 2,
                _ => eol + 1,
            };
            if eol > floor
                && window.ch(eol - 1) == Some('\\')
                && !is_escaped(window.points, eol - 1, floor)
            {
                return ScanStep::Found(Delimiter::full(Span::new(eol - 1, end)));
            }
            let mut start = eol;
            while start > floor && window.ch(start - 1) == Some(' ') {
                start -= 1;
            }
            if eol - start >= HardBreak::MIN_SPACES {
                return ScanStep::Found(Delimiter::full(Span::new(start, end)));
            }
            i = end;
        }
        ScanStep::Done
    }
}

impl InlineRecognizer for HardBreak {
    fn name(&self) -> &'static str {
        "break"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::BREAK]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SCAN | InlineHooks::SINGLE | InlineHooks::PARSE
    }

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(HardBreakScanner)
    }

    fn resolve_single(&self, delimiter: &Delimiter, _ctx: &InlineContext<'_>) -> Vec<InlineToken> {
        vec![InlineToken::new(node_type::BREAK, delimiter.span)]
    }

    fn parse(&self, token: &InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        vec![Node::Break(Void {
            position: ctx.position(token.span),
        })]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::parsing::content::Content;

    #[rstest]
    #[case("a  \nb", Some((1, 4)))]
    #[case("a\\\nb", Some((1, 3)))]
    #[case("a \nb", None)]
    #[case("a\\\\\nb", None)]
    #[case("a   \r\nb", Some((1, 6)))]
    fn finds_breaks(#[case] input: &str, #[case] expected: Option<(usize, usize)>) {
        let content = Content::new(input);
        let step = HardBreakScanner.next(&Window {
            points: content.points(),
            span: Span::new(0, content.len()),
        });
        let got = match step {
            ScanStep::Found(d) => Some((d.span.start, d.span.end)),
            ScanStep::Done => None,
        };
        assert_eq!(got, expected);
    }
}
