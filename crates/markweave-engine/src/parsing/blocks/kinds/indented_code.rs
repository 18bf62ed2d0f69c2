use crate::{
    ast::{Code, Node, NodeType, node_type},
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

/// Indented code block: lines indented by four or more columns. Cannot
/// interrupt a paragraph.
pub struct IndentedCode;

impl IndentedCode {
    pub const INDENT: usize = 4;
}

impl BlockRecognizer for IndentedCode {
    fn name(&self) -> &'static str {
        "indentedCode"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::INDENTED_CODE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER | BlockHooks::CONTINUATION | BlockHooks::FINALIZE | BlockHooks::PARSE
    }

    fn eat_opener(&self, line: &LineView<'_>, _parent: &BlockToken) -> Option<Opened> {
        if line.is_blank() || line.indent() < Self::INDENT {
            return None;
        }
        let token = BlockToken::leaf(node_type::INDENTED_CODE, Span::new(line.start(), line.end()))
            .with_line(line.skip_columns(Self::INDENT));
        Some(Opened::new(token, line.exhausted()))
    }

    fn eat_continuation_text(&self, line: &LineView<'_>, token: &mut BlockToken) -> Continuation {
        if !line.is_blank() && line.indent() < Self::INDENT {
            return Continuation::NotMatched;
        }
        token.push_line(line.skip_columns(Self::INDENT));
        Continuation::Opening {
            rest: line.exhausted(),
        }
    }

    /// Trailing blank lines belong to whatever follows.
    fn finalize(&self, token: &mut BlockToken) {
        while token.lines.last().is_some_and(|l| l.is_blank()) {
            token.lines.pop();
        }
        if let Some(last) = token.lines.last() {
            token.span.end = last.end;
        }
    }

    fn parse(
        &self,
        token: &BlockToken,
        _children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        let value = token
            .lines
            .iter()
            .map(|l| l.materialize(ctx.points))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(vec![Node::Code(Code {
            lang: None,
            meta: None,
            value,
            position: ctx.position(token.span),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::content::Content;

    fn token_for(input: &str) -> BlockToken {
        let content = Content::new(input);
        let lines = content.lines();
        let first = LineView::new(content.points(), lines[0]);
        let mut token = IndentedCode
            .eat_opener(&first, &BlockToken::container(node_type::ROOT, Span::new(0, 0)))
            .unwrap()
            .token;
        for &range in &lines[1..] {
            let view = LineView::new(content.points(), range);
            assert_ne!(
                IndentedCode.eat_continuation_text(&view, &mut token),
                Continuation::NotMatched
            );
        }
        IndentedCode.finalize(&mut token);
        token
    }

    #[test]
    fn trailing_blank_lines_are_trimmed() {
        let token = token_for("    a\n\n      b\n    \n");
        assert_eq!(token.lines.len(), 3);
        assert_eq!(token.span.end, 14);
    }

    #[test]
    fn shallow_lines_do_not_continue() {
        let content = Content::new("    a\n  b");
        let lines = content.lines();
        let first = LineView::new(content.points(), lines[0]);
        let mut token = IndentedCode
            .eat_opener(&first, &BlockToken::container(node_type::ROOT, Span::new(0, 0)))
            .unwrap()
            .token;
        let second = LineView::new(content.points(), lines[1]);
        assert_eq!(
            IndentedCode.eat_continuation_text(&second, &mut token),
            Continuation::NotMatched
        );
    }
}
