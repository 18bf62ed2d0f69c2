use crate::{
    ast::{Node, NodeType, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            open::Opened,
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::BlockToken,
        },
        content::Span,
    },
};

/// Records blank lines so list looseness can be computed after matching.
/// Blank line tokens produce no AST node.
pub struct BlankLine;

impl BlockRecognizer for BlankLine {
    fn name(&self) -> &'static str {
        "blankLine"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::BLANK_LINE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER | BlockHooks::PARSE
    }

    fn eat_opener(&self, line: &LineView<'_>, _parent: &BlockToken) -> Option<Opened> {
        line.is_blank().then(|| {
            Opened::saturated(
                BlockToken::leaf(node_type::BLANK_LINE, Span::new(line.start(), line.end())),
                line.exhausted(),
            )
        })
    }

    fn parse(
        &self,
        _token: &BlockToken,
        _children: Vec<Node>,
        _ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        Ok(Vec::new())
    }
}
