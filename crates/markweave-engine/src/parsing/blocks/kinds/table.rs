use crate::{
    ast::{self, Align, Node, NodeType, Parent, node_type},
    error::Result,
    parsing::{
        blocks::{
            classify::LineView,
            open::{Continuation, Interrupted, Interruption, Opened},
            parse::ParseContext,
            recognizer::{BlockHooks, BlockRecognizer},
            types::BlockToken,
        },
        content::{
            Span,
            chars::{is_escaped, is_space_or_tab},
        },
        payload::Payload,
    },
};

/// GFM table. A delimiter row turns the last line of the paragraph above it
/// into the header row; every following non-blank line is a body row.
pub struct Table {
    pub interruptable: Vec<NodeType>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            interruptable: vec![node_type::PARAGRAPH],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub align: Vec<Align>,
}

impl Table {
    pub const PIPE: char = '|';

    /// Cell spans of a row, outer pipes dropped and cells trimmed.
    pub fn split_row(line: &LineView<'_>) -> Vec<Span> {
        let mut start = line.first_non_ws();
        let mut end = line.end();
        while end > start && line.ch(end - 1).is_some_and(is_space_or_tab) {
            end -= 1;
        }
        if line.ch(start) == Some(Self::PIPE) {
            start += 1;
        }
        if end > start
            && line.ch(end - 1) == Some(Self::PIPE)
            && !is_escaped(line.points(), end - 1, line.start())
        {
            end -= 1;
        }

        let mut cells = Vec::new();
        let mut cell_start = start;
        for i in start..end {
            if line.ch(i) == Some(Self::PIPE) && !is_escaped(line.points(), i, line.start()) {
                cells.push(Span::new(cell_start, i));
                cell_start = i + 1;
            }
        }
        cells.push(Span::new(cell_start, end));
        cells
            .into_iter()
            .map(|span| trim(line, span))
            .collect()
    }

    fn has_pipe(line: &LineView<'_>) -> bool {
        (line.first_non_ws()..line.end()).any(|i| line.ch(i) == Some(Self::PIPE))
    }

    /// Column alignments of a delimiter row.
    pub fn delimiter_row(line: &LineView<'_>) -> Option<Vec<Align>> {
        if line.indent() >= 4 || line.is_blank() {
            return None;
        }
        Self::split_row(line)
            .into_iter()
            .map(|cell| {
                let text: String = (cell.start..cell.end).filter_map(|i| line.ch(i)).collect();
                let left = text.starts_with(':');
                let right = text.len() > 1 && text.ends_with(':');
                let dashes = text.trim_start_matches(':').trim_end_matches(':');
                if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
                    return None;
                }
                Some(match (left, right) {
                    (true, true) => Align::Center,
                    (true, false) => Align::Left,
                    (false, true) => Align::Right,
                    (false, false) => Align::None,
                })
            })
            .collect()
    }
}

fn trim(line: &LineView<'_>, span: Span) -> Span {
    let mut start = span.start;
    let mut end = span.end;
    while start < end && line.ch(start).is_some_and(is_space_or_tab) {
        start += 1;
    }
    while end > start && line.ch(end - 1).is_some_and(is_space_or_tab) {
        end -= 1;
    }
    Span::new(start, end)
}

impl BlockRecognizer for Table {
    fn name(&self) -> &'static str {
        "table"
    }

    fn priority(&self) -> i32 {
        55
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::TABLE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::INTERRUPT | BlockHooks::CONTINUATION | BlockHooks::PARSE
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
        let header_line = *prev.lines.last()?;
        let header = LineView::with_line(line.points(), header_line);
        let align = Self::delimiter_row(line)?;
        if !(Self::has_pipe(line) || Self::has_pipe(&header))
            || Self::split_row(&header).len() != align.len()
        {
            return None;
        }

        prev.lines.pop();
        let emptied = match prev.lines.last() {
            Some(last) => {
                prev.span.end = last.end;
                false
            }
            None => true,
        };
        let mut token = BlockToken::leaf(
            node_type::TABLE,
            Span::new(header.first_non_ws(), line.end()),
        )
        .with_payload(Payload::new(TableData { align }));
        token.push_line(header_line);
        token.push_line(line.line());

        let opened = Opened::new(token, line.exhausted());
        Some(if emptied {
            Interrupted::replacing(opened)
        } else {
            Interrupted::new(opened)
        })
    }

    fn eat_continuation_text(&self, line: &LineView<'_>, token: &mut BlockToken) -> Continuation {
        if line.is_blank() {
            return Continuation::NotMatched;
        }
        token.push_line(line.line());
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
        let align = token
            .payload
            .get::<TableData>()
            .map(|d| d.align.clone())
            .unwrap_or_default();
        let width = align.len();

        let mut rows = Vec::with_capacity(token.lines.len().saturating_sub(1));
        for (n, &content_line) in token.lines.iter().enumerate() {
            if n == 1 {
                continue;
            }
            let line = LineView::with_line(ctx.points, content_line);
            let mut cells = Vec::with_capacity(width);
            for span in Self::split_row(&line).into_iter().take(width) {
                let buffer: Vec<_> = (span.start..span.end)
                    .filter(|&i| {
                        !(ctx.points[i].ch == '\\'
                            && i + 1 < span.end
                            && ctx.points[i + 1].ch == Self::PIPE)
                    })
                    .map(|i| ctx.points[i])
                    .collect();
                cells.push(Node::TableCell(Parent {
                    children: ctx.inline(&buffer)?,
                    position: ctx.position(span),
                }));
            }
            while cells.len() < width {
                cells.push(Node::TableCell(Parent {
                    children: Vec::new(),
                    position: None,
                }));
            }
            rows.push(Node::TableRow(Parent {
                children: cells,
                position: ctx.position(Span::new(line.first_non_ws(), line.end())),
            }));
        }

        Ok(vec![Node::Table(ast::Table {
            align,
            children: rows,
            position: ctx.position(token.span),
        })])
    }
}
