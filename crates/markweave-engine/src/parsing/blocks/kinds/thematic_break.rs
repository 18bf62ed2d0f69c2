use crate::{
    ast::{Node, NodeType, Void, node_type},
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
    },
};

/// Thematic break: three or more `*`, `-` or `_`, optionally spaced.
pub struct ThematicBreak {
    pub interruptable: Vec<NodeType>,
}

impl Default for ThematicBreak {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH],
        }
    }
}

impl ThematicBreak {
    pub const MARKERS: [char; 3] = ['*', '-', '_'];
    pub const MIN_MARKERS: usize = 3;

    /// True when the line is a thematic break.
    pub fn matches(line: &LineView<'_>) -> bool {
        if line.indent() >= 4 {
            return false;
        }
        let Some(marker) = line.first_char().filter(|c| Self::MARKERS.contains(c)) else {
            return false;
        };
        let mut count = 0;
        for i in line.first_non_ws()..line.end() {
            match line.ch(i) {
                Some(c) if c == marker => count += 1,
                Some(c) if is_space_or_tab(c) => {}
                _ => return false,
            }
        }
        count >= Self::MIN_MARKERS
    }

    fn open(line: &LineView<'_>) -> Option<Opened> {
        Self::matches(line).then(|| {
            Opened::saturated(
                BlockToken::leaf(
                    node_type::THEMATIC_BREAK,
                    Span::new(line.first_non_ws(), line.end()),
                ),
                line.exhausted(),
            )
        })
    }
}

impl BlockRecognizer for ThematicBreak {
    fn name(&self) -> &'static str {
        "thematicBreak"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::THEMATIC_BREAK]
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
        Ok(vec![Node::ThematicBreak(Void {
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
    #[case("***", true)]
    #[case(" - - -", true)]
    #[case("_____  ", true)]
    #[case("--", false)]
    #[case("**-", false)]
    #[case("    ***", false)]
    #[case("--- a", false)]
    fn detects_breaks(#[case] input: &str, #[case] expected: bool) {
        let content = Content::new(input);
        let line = LineView::new(content.points(), content.lines()[0]);
        assert_eq!(ThematicBreak::matches(&line), expected);
    }
}
