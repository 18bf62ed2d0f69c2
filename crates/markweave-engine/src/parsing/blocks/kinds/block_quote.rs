use crate::{
    ast::{Node, NodeType, Parent, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            content::ContentLine,
            open::{Continuation, Interrupted, Interruption, Opened},
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::BlockToken,
        },
        content::Span,
    },
};

/// Blockquote container.
///
/// All blockquote syntax knowledge lives here: the `>` prefix, the optional
/// space after it (which may be one column of a tab), and the rule that a
/// quote marker needs fewer than four columns of indentation.
pub struct BlockQuote {
    pub interruptable: Vec<NodeType>,
}

impl Default for BlockQuote {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH, node_type::TABLE],
        }
    }
}

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: char = '>';

    /// Strips one quote prefix, returning what is left of the line.
    pub fn strip_prefix(line: &LineView<'_>) -> Option<ContentLine> {
        if line.indent() >= 4 || line.first_char() != Some(Self::PREFIX) {
            return None;
        }
        let after = LineView::with_line(line.points(), line.advance_to(line.first_non_ws() + 1));
        Some(after.skip_columns(1))
    }

    fn open(line: &LineView<'_>) -> Option<Opened> {
        let rest = Self::strip_prefix(line)?;
        let token = BlockToken::container(
            node_type::BLOCKQUOTE,
            Span::new(line.first_non_ws(), line.end()),
        );
        Some(Opened::new(token, rest))
    }
}

impl BlockRecognizer for BlockQuote {
    fn name(&self) -> &'static str {
        "blockquote"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::BLOCKQUOTE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER | BlockHooks::INTERRUPT | BlockHooks::CONTINUATION | BlockHooks::PARSE
    }

    fn is_containing(&self) -> bool {
        true
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

    fn eat_continuation_text(&self, line: &LineView<'_>, _token: &mut BlockToken) -> Continuation {
        match Self::strip_prefix(line) {
            Some(rest) => Continuation::Opening { rest },
            None => Continuation::NotMatched,
        }
    }

    fn parse(
        &self,
        token: &BlockToken,
        children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        Ok(vec![Node::Blockquote(Parent {
            children,
            position: ctx.position(token.span),
        })])
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::parsing::content::Content;

    fn strip(input: &str) -> Option<(usize, usize, usize)> {
        let content = Content::new(input);
        let line = LineView::new(content.points(), content.lines()[0]);
        BlockQuote::strip_prefix(&line).map(|rest| (rest.start, rest.column, rest.partial))
    }

    #[rstest]
    #[case("hello", None)]
    #[case("> hello", Some((2, 2, 0)))]
    #[case(">hello", Some((1, 1, 0)))]
    #[case("   > x", Some((5, 5, 0)))]
    #[case("    > x", None)]
    fn strips_one_prefix(#[case] input: &str, #[case] expected: Option<(usize, usize, usize)>) {
        assert_eq!(strip(input), expected);
    }

    #[test]
    fn tab_after_marker_leaves_two_columns() {
        assert_eq!(strip(">\tfoo"), Some((1, 2, 2)));
    }

    #[test]
    fn nested_prefix_is_left_for_the_child() {
        let content = Content::new("> > a");
        let line = LineView::new(content.points(), content.lines()[0]);
        let rest = BlockQuote::strip_prefix(&line).unwrap();
        let inner = LineView::with_line(content.points(), rest);
        assert_eq!(inner.first_char(), Some('>'));
        assert!(BlockQuote::strip_prefix(&inner).is_some());
    }
}
