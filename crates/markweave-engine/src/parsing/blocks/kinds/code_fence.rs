use crate::{
    ast::{Code, Node, NodeType, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            open::{Continuation, Interrupted, Interruption, Opened},
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::BlockToken,
        },
        content::Span,
        decode::decode,
        payload::Payload,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    pub fn marker(self) -> char {
        match self {
            FenceKind::Backticks => CodeFence::BACKTICK,
            FenceKind::Tildes => CodeFence::TILDE,
        }
    }

    fn of(ch: char) -> Option<Self> {
        match ch {
            CodeFence::BACKTICK => Some(FenceKind::Backticks),
            CodeFence::TILDE => Some(FenceKind::Tildes),
            _ => None,
        }
    }
}

/// An opening fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceData {
    pub kind: FenceKind,
    /// Length of the opening run; the closing run must be at least as long.
    pub len: usize,
    /// Indentation of the opening fence, removed from content lines.
    pub indent: usize,
    /// Info string, trimmed.
    pub info: Span,
}

/// Fenced code block. Its content is a raw zone: no block or inline parsing
/// happens inside.
pub struct CodeFence {
    pub interruptable: Vec<NodeType>,
}

impl Default for CodeFence {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH, node_type::TABLE],
        }
    }
}

impl CodeFence {
    pub const BACKTICK: char = '`';
    pub const TILDE: char = '~';
    pub const MIN_LEN: usize = 3;

    /// Recognizes an opening fence.
    pub fn opening(line: &LineView<'_>) -> Option<FenceData> {
        if line.indent() >= 4 {
            return None;
        }
        let start = line.first_non_ws();
        let kind = FenceKind::of(line.first_char()?)?;
        let len = line.run_length(start, kind.marker());
        if len < Self::MIN_LEN {
            return None;
        }
        let info_start = line.skip_spaces(start + len);
        let mut info_end = line.end();
        while info_end > info_start && line.ch(info_end - 1).is_some_and(char::is_whitespace) {
            info_end -= 1;
        }
        if kind == FenceKind::Backticks
            && (info_start..info_end).any(|i| line.ch(i) == Some(Self::BACKTICK))
        {
            return None;
        }
        Some(FenceData {
            kind,
            len,
            indent: line.indent(),
            info: Span::new(info_start, info_end),
        })
    }

    /// True when the line closes the fence opened by `fence`.
    pub fn closes(fence: &FenceData, line: &LineView<'_>) -> bool {
        if line.indent() >= 4 || line.first_char() != Some(fence.kind.marker()) {
            return false;
        }
        let run = line.run_length(line.first_non_ws(), fence.kind.marker());
        run >= fence.len && line.rest_is_blank(line.first_non_ws() + run)
    }

    fn open(line: &LineView<'_>) -> Option<Opened> {
        let data = Self::opening(line)?;
        let token = BlockToken::leaf(node_type::CODE, Span::new(line.first_non_ws(), line.end()))
            .with_payload(Payload::new(data));
        Some(Opened::new(token, line.exhausted()))
    }
}

impl BlockRecognizer for CodeFence {
    fn name(&self) -> &'static str {
        "fencedCode"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::CODE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER | BlockHooks::INTERRUPT | BlockHooks::CONTINUATION | BlockHooks::PARSE
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

    fn eat_continuation_text(&self, line: &LineView<'_>, token: &mut BlockToken) -> Continuation {
        let Some(fence) = token.payload.get::<FenceData>().copied() else {
            return Continuation::NotMatched;
        };
        if Self::closes(&fence, line) {
            token.span.end = line.end();
            return Continuation::Closing {
                rest: line.exhausted(),
            };
        }
        token.push_line(line.skip_columns(fence.indent));
        Continuation::Opening {
            rest: line.exhausted(),
        }
    }

    fn parse(
        &self,
        token: &BlockToken,
        _children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        let (lang, meta) = match token.payload.get::<FenceData>() {
            Some(fence) if !fence.info.is_empty() => {
                let info = decode(&ctx.text(fence.info));
                match info.split_once(char::is_whitespace) {
                    Some((lang, meta)) => {
                        let meta = meta.trim();
                        (
                            Some(lang.to_string()),
                            (!meta.is_empty()).then(|| meta.to_string()),
                        )
                    }
                    None => (Some(info), None),
                }
            }
            _ => (None, None),
        };
        let value = token
            .lines
            .iter()
            .map(|l| l.materialize(ctx.points))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(vec![Node::Code(Code {
            lang,
            meta,
            value,
            position: ctx.position(token.span),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::content::{Content, slice_to_string};

    fn line(content: &Content, index: usize) -> LineView<'_> {
        LineView::new(content.points(), content.lines()[index])
    }

    #[test]
    fn detect_backtick_fence() {
        let content = Content::new("```rust  ");
        let fence = CodeFence::opening(&line(&content, 0)).unwrap();
        assert_eq!(fence.kind, FenceKind::Backticks);
        assert_eq!(fence.len, 3);
        assert_eq!(slice_to_string(content.points(), fence.info), "rust");
    }

    #[test]
    fn detect_tilde_fence() {
        let content = Content::new("  ~~~~");
        let fence = CodeFence::opening(&line(&content, 0)).unwrap();
        assert_eq!(fence.kind, FenceKind::Tildes);
        assert_eq!(fence.indent, 2);
        assert!(fence.info.is_empty());
    }

    #[test]
    fn no_fence() {
        for input in ["hello", "``", "    ```", "``` a`b"] {
            let content = Content::new(input);
            assert!(CodeFence::opening(&line(&content, 0)).is_none(), "{input}");
        }
    }

    #[test]
    fn closes_matching_fence() {
        let content = Content::new("````\n```\n`````  \n~~~~");
        let fence = CodeFence::opening(&line(&content, 0)).unwrap();
        assert!(!CodeFence::closes(&fence, &line(&content, 1)));
        assert!(CodeFence::closes(&fence, &line(&content, 2)));
        assert!(!CodeFence::closes(&fence, &line(&content, 3)));
    }
}
