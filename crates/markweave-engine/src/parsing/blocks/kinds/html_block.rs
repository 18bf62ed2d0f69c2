use std::sync::OnceLock;

use regex::Regex;

use crate::{
    ast::{Literal, Node, NodeType, node_type},
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
        html::{BLOCK_TAGS, RAW_TAGS, closing_tag, open_tag},
        payload::Payload,
    },
};

/// Raw HTML block. The seven start conditions are tried in order; kinds 1
/// to 5 run until their end marker, kinds 6 and 7 until a blank line.
pub struct HtmlBlock {
    pub interruptable: Vec<NodeType>,
}

impl Default for HtmlBlock {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH, node_type::TABLE],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlData {
    /// Start condition, 1 to 7.
    pub kind: u8,
}

impl HtmlData {
    fn ends_at_blank_line(self) -> bool {
        self.kind >= 6
    }
}

fn start_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let raw = RAW_TAGS.join("|");
        let block = BLOCK_TAGS.join("|");
        [
            format!(r"^<(?i:{raw})(?:[ \t>]|$)"),
            r"^<!--".to_string(),
            r"^<\?".to_string(),
            r"^<![A-Za-z]".to_string(),
            r"^<!\[CDATA\[".to_string(),
            format!(r"^</?(?i:{block})(?:[ \t]|/?>|$)"),
            format!(r"^(?:{}|{})[ \t]*$", open_tag(), closing_tag()),
        ]
        .iter()
        .map(|p| Regex::new(p).expect("html block start pattern is valid"))
        .collect()
    })
}

fn end_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        let raw = RAW_TAGS.join("|");
        [
            format!(r"(?i:</(?:{raw})>)"),
            r"-->".to_string(),
            r"\?>".to_string(),
            r">".to_string(),
            r"\]\]>".to_string(),
        ]
        .iter()
        .map(|p| Regex::new(p).expect("html block end pattern is valid"))
        .collect()
    })
}

impl HtmlBlock {
    /// Start condition matched by the line, if any.
    pub fn start_kind(line: &LineView<'_>) -> Option<u8> {
        if line.indent() >= 4 || line.first_char() != Some('<') {
            return None;
        }
        let text = line.text_from(line.first_non_ws());
        let index = start_patterns().iter().position(|re| re.is_match(&text))?;
        if index == 6 {
            let caps = start_patterns()[6].captures(&text)?;
            let name = caps.get(1).or_else(|| caps.get(2))?.as_str();
            if RAW_TAGS.contains(&name.to_ascii_lowercase().as_str()) {
                return None;
            }
        }
        Some(index as u8 + 1)
    }

    /// True when the line holds the end marker of a kind 1 to 5 block.
    fn ends(data: HtmlData, text: &str) -> bool {
        end_patterns()
            .get(usize::from(data.kind) - 1)
            .is_some_and(|re| re.is_match(text))
    }

    fn open(line: &LineView<'_>, kind: u8) -> Opened {
        let data = HtmlData { kind };
        let token = BlockToken::leaf(node_type::HTML, Span::new(line.start(), line.end()))
            .with_payload(Payload::new(data))
            .with_line(line.line());
        if !data.ends_at_blank_line() && Self::ends(data, &line.text_from(line.first_non_ws())) {
            Opened::saturated(token, line.exhausted())
        } else {
            Opened::new(token, line.exhausted())
        }
    }
}

impl BlockRecognizer for HtmlBlock {
    fn name(&self) -> &'static str {
        "html"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::HTML]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::OPENER | BlockHooks::INTERRUPT | BlockHooks::CONTINUATION | BlockHooks::PARSE
    }

    fn interruptable(&self) -> &[NodeType] {
        &self.interruptable
    }

    fn eat_opener(&self, line: &LineView<'_>, _parent: &BlockToken) -> Option<Opened> {
        Self::start_kind(line).map(|kind| Self::open(line, kind))
    }

    /// Kind 7 never interrupts.
    fn eat_and_interrupt_previous_sibling(
        &self,
        line: &LineView<'_>,
        _prev: &mut BlockToken,
        _how: Interruption,
    ) -> Option<Interrupted> {
        let kind = Self::start_kind(line).filter(|&k| k < 7)?;
        Some(Interrupted::new(Self::open(line, kind)))
    }

    fn eat_continuation_text(&self, line: &LineView<'_>, token: &mut BlockToken) -> Continuation {
        let Some(data) = token.payload.get::<HtmlData>().copied() else {
            return Continuation::NotMatched;
        };
        if data.ends_at_blank_line() {
            if line.is_blank() {
                return Continuation::NotMatched;
            }
            token.push_line(line.line());
            return Continuation::Opening {
                rest: line.exhausted(),
            };
        }
        token.push_line(line.line());
        if Self::ends(data, &line.text_from(line.start())) {
            Continuation::Closing {
                rest: line.exhausted(),
            }
        } else {
            Continuation::Opening {
                rest: line.exhausted(),
            }
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
        Ok(vec![Node::Html(Literal {
            value,
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
    #[case("<script type=\"x\">", Some(1))]
    #[case("<PRE>", Some(1))]
    #[case("<!-- note", Some(2))]
    #[case("<?php", Some(3))]
    #[case("<!DOCTYPE html>", Some(4))]
    #[case("<![CDATA[", Some(5))]
    #[case("<div class=\"a\">", Some(6))]
    #[case("</table>", Some(6))]
    #[case("<custom-tag>", Some(7))]
    #[case("</a>  ", Some(7))]
    #[case("<a href=\"x\">text", None)]
    #[case("    <div>", None)]
    #[case("<divider", None)]
    fn start_conditions(#[case] input: &str, #[case] expected: Option<u8>) {
        let content = Content::new(input);
        let line = LineView::new(content.points(), content.lines()[0]);
        assert_eq!(HtmlBlock::start_kind(&line), expected);
    }

    #[test]
    fn comment_on_one_line_is_saturated() {
        let content = Content::new("<!-- a -->");
        let line = LineView::new(content.points(), content.lines()[0]);
        let opened = HtmlBlock::default()
            .eat_opener(&line, &BlockToken::container(node_type::ROOT, Span::new(0, 0)))
            .unwrap();
        assert!(opened.saturated);
    }
}
