use crate::{
    ast::{self, Node, NodeType, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            open::{Interrupted, Interruption, Opened},
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::BlockToken,
        },
        content::{Span, chars::is_space_or_tab},
        payload::Payload,
    },
};

/// ATX heading: one to six `#`, then the heading text, then an optional
/// closing sequence of `#`.
pub struct Heading {
    pub interruptable: Vec<NodeType>,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH, node_type::TABLE],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingData {
    pub depth: u8,
    /// Heading text, closing sequence and surrounding whitespace excluded.
    pub content: Span,
}

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_DEPTH: usize = 6;

    pub fn scan(line: &LineView<'_>) -> Option<HeadingData> {
        if line.indent() >= 4 || line.first_char() != Some(Self::MARKER) {
            return None;
        }
        let start = line.first_non_ws();
        let depth = line.run_length(start, Self::MARKER);
        if depth > Self::MAX_DEPTH {
            return None;
        }
        let after = start + depth;
        if line.ch(after).is_some_and(|c| !is_space_or_tab(c)) {
            return None;
        }

        let content_start = line.skip_spaces(after);
        let mut end = line.end();
        while end > content_start && line.ch(end - 1).is_some_and(is_space_or_tab) {
            end -= 1;
        }
        let mut closing = end;
        while closing > content_start && line.ch(closing - 1) == Some(Self::MARKER) {
            closing -= 1;
        }
        if closing == content_start {
            end = content_start;
        } else if closing < end && line.ch(closing - 1).is_some_and(is_space_or_tab) {
            end = closing;
            while end > content_start && line.ch(end - 1).is_some_and(is_space_or_tab) {
                end -= 1;
            }
        }

        Some(HeadingData {
            depth: depth as u8,
            content: Span::new(content_start, end),
        })
    }

    fn open(line: &LineView<'_>) -> Option<Opened> {
        let data = Self::scan(line)?;
        let token = BlockToken::leaf(
            node_type::HEADING,
            Span::new(line.first_non_ws(), line.end()),
        )
        .with_payload(Payload::new(data));
        Some(Opened::saturated(token, line.exhausted()))
    }
}

impl BlockRecognizer for Heading {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn priority(&self) -> i32 {
        70
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::HEADING]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER | BlockHooks::INTERRUPT | BlockHooks::PARSE
    }

    fn interruptable(&self) -> &[NodeType] {
        &self.interruptable
    }

    fn eat_opener(&self, line: &LineView<'_>, _parent: &BlockToken) -> Option<Opened> {
        Self::open(line)
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        line: &LineView<'_>,
        _prev: &mut BlockToken,
        _how: Interruption,
    ) -> Option<Interrupted> {
        Self::open(line).map(Interrupted::new)
    }

    fn parse(
        &self,
        token: &BlockToken,
        _children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        let Some(data) = token.payload.get::<HeadingData>() else {
            return Ok(Vec::new());
        };
        Ok(vec![Node::Heading(ast::Heading {
            depth: data.depth,
            children: ctx.phrasing_span(data.content)?,
            position: ctx.position(token.span),
        })])
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::parsing::content::{Content, slice_to_string};

    #[rstest]
    #[case("# foo", Some((1, "foo")))]
    #[case("###### foo ###", Some((6, "foo")))]
    #[case("## foo #bar", Some((2, "foo #bar")))]
    #[case("### foo \\###", Some((3, "foo \\###")))]
    #[case("#", Some((1, "")))]
    #[case("## ###", Some((2, "")))]
    #[case("#5 bolt", None)]
    #[case("####### foo", None)]
    #[case("    # foo", None)]
    fn scans_atx_headings(#[case] input: &str, #[case] expected: Option<(u8, &str)>) {
        let content = Content::new(input);
        let line = LineView::new(content.points(), content.lines()[0]);
        let got = Heading::scan(&line)
            .map(|d| (d.depth, slice_to_string(content.points(), d.content)));
        assert_eq!(got, expected.map(|(d, s)| (d, s.to_string())));
    }
}
