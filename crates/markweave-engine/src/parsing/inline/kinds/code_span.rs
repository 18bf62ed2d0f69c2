use std::collections::{HashMap, VecDeque};

use crate::{
    ast::{Literal, Node, NodeType, node_type},
    parsing::{
        content::{Span, chars::is_escaped},
        inline::{
            recognizer::{
                DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer, ScanStep, Window,
            },
            types::{Delimiter, InlineToken},
        },
        payload::Payload,
    },
};

/// Code spans: a backtick run closed by the next run of the same length.
///
/// Code spans are raw zones: nothing inside them is matched by any other
/// recognizer, and backslashes inside them are literal.
pub struct CodeSpan;

impl CodeSpan {
    pub const TICK: char = '`';
}

/// Number of backticks around the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSpanData {
    pub ticks: usize,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    len: usize,
    /// Where the run may open, after a leading escaped backtick.
    open_start: usize,
}

impl Run {
    fn end(&self) -> usize {
        self.start + self.len
    }

    fn open_len(&self) -> usize {
        self.end() - self.open_start
    }
}

/// Backtick runs of the current gap, with per-length queues of the runs
/// still available as closers.
#[derive(Default)]
struct CodeSpanScanner {
    gap_end: Option<usize>,
    runs: Vec<Run>,
    by_len: HashMap<usize, VecDeque<usize>>,
    next: usize,
}

impl CodeSpanScanner {
    fn load(&mut self, window: &Window<'_>) {
        self.gap_end = Some(window.span.end);
        self.runs.clear();
        self.by_len.clear();
        self.next = 0;

        let mut i = window.span.start;
        while let Some(start) = window.find(i, |c| c == CodeSpan::TICK) {
            let mut end = start;
            while end < window.span.end && window.ch(end) == Some(CodeSpan::TICK) {
                end += 1;
            }
            let open_start = if is_escaped(window.points, start, window.span.start) {
                start + 1
            } else {
                start
            };
            self.by_len
                .entry(end - start)
                .or_default()
                .push_back(self.runs.len());
            self.runs.push(Run {
                start,
                len: end - start,
                open_start,
            });
            i = end;
        }
    }

    /// The first run after `opener` with exactly `len` backticks.
    fn closer(&mut self, opener: usize, len: usize) -> Option<usize> {
        let queue = self.by_len.get_mut(&len)?;
        while queue.front().is_some_and(|&j| j <= opener) {
            queue.pop_front();
        }
        queue.front().copied()
    }
}

impl DelimiterScanner for CodeSpanScanner {
    fn next(&mut self, window: &Window<'_>) -> ScanStep {
        if self.gap_end != Some(window.span.end) {
            self.load(window);
        }
        while self.next < self.runs.len() {
            let i = self.next;
            self.next += 1;
            let run = self.runs[i];
            if run.start < window.span.start || run.open_len() == 0 {
                continue;
            }
            if let Some(j) = self.closer(i, run.open_len()) {
                return ScanStep::Found(Delimiter::full(Span::new(
                    run.open_start,
                    self.runs[j].end(),
                )));
            }
        }
        ScanStep::Done
    }
}

impl InlineRecognizer for CodeSpan {
    fn name(&self) -> &'static str {
        "inlineCode"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::INLINE_CODE]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SCAN | InlineHooks::SINGLE | InlineHooks::PARSE
    }

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(CodeSpanScanner::default())
    }

    fn resolve_single(&self, delimiter: &Delimiter, ctx: &InlineContext<'_>) -> Vec<InlineToken> {
        let span = delimiter.span;
        let ticks = (span.start..span.end)
            .take_while(|&i| ctx.ch(i) == Some(Self::TICK))
            .count();
        vec![
            InlineToken::new(node_type::INLINE_CODE, span)
                .with_payload(Payload::new(CodeSpanData { ticks })),
        ]
    }

    fn parse(&self, token: &InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        let ticks = token.payload.get::<CodeSpanData>().map_or(1, |d| d.ticks);
        let inner = Span::new(token.span.start + ticks, token.span.end - ticks);
        vec![Node::InlineCode(Literal {
            value: code_value(&ctx.text(inner)),
            position: ctx.position(token.span),
        })]
    }
}

/// Line endings become spaces; one space is stripped from both ends when
/// the code is padded on both sides and not made of spaces only.
fn code_value(raw: &str) -> String {
    let value = raw.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let padded = value.len() >= 2 && value.starts_with(' ') && value.ends_with(' ');
    if padded && !value.bytes().all(|b| b == b' ') {
        value[1..value.len() - 1].to_string()
    } else {
        value
    }
}
