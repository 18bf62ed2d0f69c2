use crate::{
    ast::{Node, NodeType, Parent, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            open::{Continuation, Opened},
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::BlockToken,
        },
        content::Span,
    },
};

/// Paragraph block type, the block fallback.
///
/// Paragraphs have no delimiters: they take any non-blank remainder no other
/// opener claimed, and they are the only leaf accepting lazy continuation
/// lines. Inline parsing is applied to their lines.
pub struct Paragraph;

impl Paragraph {
    fn take_line(line: &LineView<'_>, token: &mut BlockToken) -> bool {
        if line.is_blank() {
            return false;
        }
        token.push_line(line.line());
        true
    }
}

impl BlockRecognizer for Paragraph {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::PARAGRAPH]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER
            | BlockHooks::CONTINUATION
            | BlockHooks::LAZY_CONTINUATION
            | BlockHooks::PARSE
    }

    fn eat_opener(&self, line: &LineView<'_>, _parent: &BlockToken) -> Option<Opened> {
        if line.is_blank() {
            return None;
        }
        let token = BlockToken::leaf(
            node_type::PARAGRAPH,
            Span::new(line.first_non_ws(), line.end()),
        )
        .with_line(line.line());
        Some(Opened::new(token, line.exhausted()))
    }

    fn eat_continuation_text(&self, line: &LineView<'_>, token: &mut BlockToken) -> Continuation {
        if Self::take_line(line, token) {
            Continuation::Opening {
                rest: line.exhausted(),
            }
        } else {
            Continuation::NotMatched
        }
    }

    fn eat_lazy_continuation_text(&self, line: &LineView<'_>, token: &mut BlockToken) -> bool {
        Self::take_line(line, token)
    }

    fn parse(
        &self,
        token: &BlockToken,
        _children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        Ok(vec![Node::Paragraph(Parent {
            children: ctx.phrasing(&token.lines)?,
            position: ctx.position(token.span),
        })])
    }
}
