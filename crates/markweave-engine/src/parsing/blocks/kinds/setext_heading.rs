use crate::{
    ast::{self, Node, NodeType, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            content::ContentLine,
            open::{Interrupted, Interruption, Opened},
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::BlockToken,
        },
        content::Span,
        payload::Payload,
    },
};

/// Setext heading: an `=` or `-` underline turning the paragraph above it
/// into a heading. Underlines never continue a lazy paragraph.
pub struct SetextHeading {
    pub interruptable: Vec<NodeType>,
}

impl Default for SetextHeading {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetextData {
    pub depth: u8,
    pub underline: ContentLine,
}

impl SetextHeading {
    pub const LEVEL_1: char = '=';
    pub const LEVEL_2: char = '-';

    /// Heading depth of an underline, if the line is one.
    pub fn underline_depth(line: &LineView<'_>) -> Option<u8> {
        if line.indent() >= 4 {
            return None;
        }
        let depth = match line.first_char()? {
            Self::LEVEL_1 => 1,
            Self::LEVEL_2 => 2,
            _ => return None,
        };
        let marker = line.first_char()?;
        let run = line.run_length(line.first_non_ws(), marker);
        line.rest_is_blank(line.first_non_ws() + run)
            .then_some(depth)
    }
}

impl BlockRecognizer for SetextHeading {
    fn name(&self) -> &'static str {
        "setextHeading"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::SETEXT_HEADING]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::INTERRUPT | BlockHooks::PARSE
    }

    fn interruptable(&self) -> &[NodeType] {
        &self.interruptable
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        line: &LineView<'_>,
        prev: &mut BlockToken,
        how: Interruption,
    ) -> Option<Interrupted> {
        if how != Interruption::Sibling || !prev.is(node_type::PARAGRAPH) {
            return None;
        }
        let depth = Self::underline_depth(line)?;
        let mut token = BlockToken::leaf(
            node_type::SETEXT_HEADING,
            Span::new(prev.span.start, line.end()),
        )
        .with_payload(Payload::new(SetextData {
            depth,
            underline: line.line(),
        }));
        token.lines = std::mem::take(&mut prev.lines);
        Some(Interrupted::replacing(Opened::saturated(
            token,
            line.exhausted(),
        )))
    }

    fn parse(
        &self,
        token: &BlockToken,
        _children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        let depth = token.payload.get::<SetextData>().map_or(1, |d| d.depth);
        Ok(vec![Node::Heading(ast::Heading {
            depth,
            children: ctx.phrasing(&token.lines)?,
            position: ctx.position(token.span),
        })])
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::parsing::content::Content;

    #[rstest]
    #[case("===", Some(1))]
    #[case("  -   ", Some(2))]
    #[case("=", Some(1))]
    #[case("= =", None)]
    #[case("    ---", None)]
    #[case("--a", None)]
    fn underlines(#[case] input: &str, #[case] expected: Option<u8>) {
        let content = Content::new(input);
        let line = LineView::new(content.points(), content.lines()[0]);
        assert_eq!(SetextHeading::underline_depth(&line), expected);
    }
}
