//! Link reference definitions.
//!
//! Definitions are never matched line by line: they start out as paragraph
//! text (or as the text of a setext heading) and are peeled off the front of
//! it in the post-match pass. The meta pass then turns them into the
//! [`Definitions`] table links resolve against.

use std::any::Any;

use log::trace;

use crate::{
    ast::{self, Node, NodeType, node_type},
    error::Result,
    parsing::{
        blocks::{
            content::phrasing_points,
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::{BlockToken, BlockTree, TokenId},
        },
        content::{NodePoint, Span, chars::is_line_ending},
        decode::decode,
        links::{Definitions, LinkTarget, normalize_label, scan_definition},
        payload::Payload,
    },
};

use super::setext_heading::SetextData;

pub struct Definition;

/// Raw source text of a definition's parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionData {
    pub label: String,
    pub destination: String,
    pub title: Option<String>,
}

impl DefinitionData {
    fn target(&self) -> LinkTarget {
        LinkTarget {
            url: decode(&self.destination),
            title: self.title.as_deref().map(decode),
        }
    }
}

fn text(buffer: &[NodePoint], span: Span) -> String {
    buffer[span.start..span.end].iter().map(|p| p.ch).collect()
}

/// Lines covered by `buffer[..end]`.
fn lines_in(buffer: &[NodePoint], end: usize) -> usize {
    let endings = (0..end)
        .filter(|&i| match buffer[i].ch {
            '\n' => true,
            '\r' => buffer.get(i + 1).is_none_or(|p| p.ch != '\n'),
            _ => false,
        })
        .count();
    if end == buffer.len() { endings + 1 } else { endings }
}

impl Definition {
    /// Peels definitions off the front of a paragraph or setext heading.
    ///
    /// Returns the definition tokens and the number of lines they used.
    fn peel(tree: &mut BlockTree, id: TokenId, points: &[NodePoint]) -> (Vec<TokenId>, usize) {
        let buffer = phrasing_points(points, &tree[id].lines);
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(def) = scan_definition(&buffer, pos) {
            let mut last = def.end;
            while last > pos && is_line_ending(buffer[last - 1].ch) {
                last -= 1;
            }
            let span = Span::new(buffer[pos].offset, buffer[last - 1].offset + 1);
            let data = DefinitionData {
                label: text(&buffer, def.label),
                destination: text(&buffer, def.destination),
                title: def.title.map(|t| text(&buffer, t)),
            };
            trace!("definition [{}] at {}", data.label, span.start);
            let mut token =
                BlockToken::leaf(node_type::DEFINITION, span).with_payload(Payload::new(data));
            token.opening = false;
            found.push(tree.alloc(token));
            pos = def.end;
            if pos >= buffer.len() {
                break;
            }
        }
        let consumed = if found.is_empty() {
            0
        } else {
            lines_in(&buffer, pos)
        };
        (found, consumed)
    }
}

impl BlockRecognizer for Definition {
    fn name(&self) -> &'static str {
        "definition"
    }

    fn priority(&self) -> i32 {
        45
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::DEFINITION]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::TRANSFORM_SIBLINGS | BlockHooks::PARSE_META | BlockHooks::PARSE
    }

    fn transform_siblings(
        &self,
        siblings: Vec<TokenId>,
        tree: &mut BlockTree,
        points: &[NodePoint],
    ) -> Vec<TokenId> {
        let mut out = Vec::with_capacity(siblings.len());
        for id in siblings {
            let token = &tree[id];
            let is_setext = token.is(node_type::SETEXT_HEADING);
            if !(token.is(node_type::PARAGRAPH) || is_setext) {
                out.push(id);
                continue;
            }
            let (definitions, consumed) = Self::peel(tree, id, points);
            out.extend(definitions);
            if consumed == 0 {
                out.push(id);
                continue;
            }

            let token = &mut tree[id];
            token.lines.drain(..consumed.min(token.lines.len()));
            if let Some(first) = token.lines.first() {
                token.span.start = first.first_non_ws;
                out.push(id);
            } else if is_setext {
                let Some(underline) = token.payload.get::<SetextData>().map(|d| d.underline)
                else {
                    continue;
                };
                token.node_type = node_type::PARAGRAPH;
                token.span = Span::new(underline.first_non_ws, underline.end);
                token.payload = Payload::none();
                token.lines = vec![underline];
                out.push(id);
            }
        }
        out
    }

    fn parse_meta(&self, tokens: &[&BlockToken]) -> Option<Box<dyn Any + Send + Sync>> {
        let mut definitions = Definitions::default();
        for token in tokens {
            if let Some(data) = token.payload.get::<DefinitionData>() {
                definitions.insert_first(&data.label, data.target());
            }
        }
        Some(Box::new(definitions))
    }

    fn parse(
        &self,
        token: &BlockToken,
        _children: Vec<Node>,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        let Some(data) = token.payload.get::<DefinitionData>() else {
            return Ok(Vec::new());
        };
        let target = data.target();
        Ok(vec![Node::Definition(ast::Definition {
            identifier: normalize_label(&data.label),
            label: data.label.clone(),
            url: target.url,
            title: target.title,
            position: ctx.position(token.span),
        })])
    }
}
