use log::trace;

use crate::{
    ast::Node,
    error::{Error, Result},
    parsing::{
        ParseOptions,
        blocks::types::Meta,
        content::{NodePoint, Position, Span},
        registry::{Registry, Tier},
    },
};

use super::{
    interval::{fold, gaps},
    recognizer::{DelimiterScanner, InlineContext, Pair, Pairing, ScanStep, Window},
    types::{Delimiter, DelimiterKind, InlineToken},
};

/// Runs the inline recognizers of a registry over one phrasing buffer.
///
/// Tiers are matched in descending priority. Each tier only scans the gaps
/// left by the tokens of the tiers before it, then pairs its delimiters and
/// folds the result into the forest. Tokens exposing inner spans are
/// excavated afterwards: their inner content is matched again with the
/// tiers below their own. Whatever no token claims becomes text.
pub struct InlineMatcher<'a> {
    registry: &'a Registry,
    ctx: InlineContext<'a>,
}

/// What a scanner last reported for the current gap.
#[derive(Clone, Copy)]
enum Slot {
    Unknown,
    Found(Delimiter),
    Done,
}

impl<'a> InlineMatcher<'a> {
    pub fn new(
        registry: &'a Registry,
        points: &'a [NodePoint],
        meta: &'a Meta,
        options: &'a ParseOptions,
    ) -> Self {
        Self {
            registry,
            ctx: InlineContext {
                points,
                bounds: Span::new(0, points.len()),
                meta,
                options,
            },
        }
    }

    /// The resolved token forest, text included.
    pub fn tokenize(&self) -> Vec<InlineToken> {
        let bounds = self.ctx.bounds;
        let forest = self.match_span(bounds, self.registry.inline_tiers(), Vec::new());
        self.fill_text(bounds, forest)
    }

    /// Inline AST nodes of the buffer.
    pub fn parse(&self) -> Result<Vec<Node>> {
        let tokens = self.tokenize();
        self.parse_tokens(&tokens)
    }

    fn parse_tokens(&self, tokens: &[InlineToken]) -> Result<Vec<Node>> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            let children = self.parse_tokens(&token.children)?;
            let index = self
                .registry
                .inline_parser(token.node_type)
                .ok_or_else(|| Error::MissingParser {
                    node_type: token.node_type.to_string(),
                })?;
            out.extend(self.registry.inline(index).parse(token, children, &self.ctx));
        }
        Ok(merge_text(out))
    }

    fn match_span(&self, span: Span, tiers: &[Tier], existing: Vec<InlineToken>) -> Vec<InlineToken> {
        let ctx = InlineContext {
            bounds: span,
            ..self.ctx
        };
        let mut forest = existing;
        for tier in tiers {
            let gaps = gaps(span, &forest);
            if gaps.is_empty() {
                break;
            }
            let delimiters = self.collect(tier, &gaps);
            if delimiters.is_empty() {
                continue;
            }
            trace!(
                "tier {}: {} delimiters in {}..{}",
                tier.priority,
                delimiters.len(),
                span.start,
                span.end
            );
            let produced = self.pair(delimiters, &forest, &ctx);
            forest = fold(forest, produced);
        }
        forest.into_iter().map(|t| self.excavate(t)).collect()
    }

    /// Matches the inner spans of `token` with the tiers below its owner.
    fn excavate(&self, mut token: InlineToken) -> InlineToken {
        if token.excavated {
            return token;
        }
        token.excavated = true;

        let priority = self.registry.inline(token.recognizer).priority();
        let all = self.registry.inline_tiers();
        let lower = &all[all.partition_point(|t| t.priority >= priority)..];

        let mut children = std::mem::take(&mut token.children).into_iter().peekable();
        let mut excavated = Vec::new();
        for inner in token.inner.clone() {
            while children.next_if(|c| c.span.end <= inner.start).is_some() {}
            let mut inside = Vec::new();
            while let Some(child) = children.next_if(|c| c.span.start < inner.end) {
                if inner.contains(child.span) {
                    inside.push(child);
                }
            }
            excavated.extend(self.match_span(inner, lower, inside));
        }
        token.children = excavated;
        token
    }

    /// Delimiters of one tier over `gaps`, in document order and disjoint.
    ///
    /// Every scanner is driven forward through each gap; of the candidates
    /// on offer the earliest wins, ties going to the member registered
    /// first. Scanners whose candidate got overtaken are asked again from
    /// the new position.
    fn collect(&self, tier: &Tier, gaps: &[Span]) -> Vec<Delimiter> {
        let mut scanners: Vec<Box<dyn DelimiterScanner>> = tier
            .members
            .iter()
            .map(|&m| self.registry.inline(m).scanner())
            .collect();
        let mut out = Vec::new();

        for &gap in gaps {
            let mut slots = vec![Slot::Unknown; scanners.len()];
            let mut pos = gap.start;
            loop {
                let window = Window {
                    points: self.ctx.points,
                    span: Span::new(pos, gap.end),
                };
                for (slot, scanner) in slots.iter_mut().zip(scanners.iter_mut()) {
                    let stale = match slot {
                        Slot::Unknown => true,
                        Slot::Found(d) => d.span.start < pos,
                        Slot::Done => false,
                    };
                    if !stale {
                        continue;
                    }
                    *slot = match scanner.next(&window) {
                        ScanStep::Found(d) if !d.is_empty() && window.span.contains(d.span) => {
                            Slot::Found(d)
                        }
                        _ => Slot::Done,
                    };
                }

                let best = slots
                    .iter()
                    .enumerate()
                    .filter_map(|(k, slot)| match slot {
                        Slot::Found(d) => Some((k, *d)),
                        _ => None,
                    })
                    .min_by_key(|(k, d)| (d.span.start, *k));
                let Some((k, mut delimiter)) = best else {
                    break;
                };
                delimiter.recognizer = tier.members[k];
                pos = delimiter.span.end;
                slots[k] = Slot::Unknown;
                out.push(delimiter);
            }
        }
        out
    }

    /// Resolves one tier's delimiters into tokens.
    fn pair(
        &self,
        delimiters: Vec<Delimiter>,
        claimed: &[InlineToken],
        ctx: &InlineContext<'_>,
    ) -> Vec<InlineToken> {
        let mut stack: Vec<Delimiter> = Vec::new();
        let mut out: Vec<InlineToken> = Vec::new();

        for delimiter in delimiters {
            if out.last().is_some_and(|t| delimiter.span.start < t.span.end) {
                continue;
            }
            match delimiter.kind {
                DelimiterKind::Full => {
                    let tokens = self
                        .registry
                        .inline(delimiter.recognizer)
                        .resolve_single(&delimiter, ctx);
                    emit(&mut out, tokens, delimiter.recognizer);
                }
                DelimiterKind::Opener => stack.push(delimiter),
                DelimiterKind::Closer | DelimiterKind::Both => {
                    self.close(delimiter, &mut stack, &mut out, claimed, ctx);
                }
            }
        }
        out
    }

    fn close(
        &self,
        mut closer: Delimiter,
        stack: &mut Vec<Delimiter>,
        out: &mut Vec<InlineToken>,
        claimed: &[InlineToken],
        ctx: &InlineContext<'_>,
    ) {
        let recognizer = self.registry.inline(closer.recognizer);
        'closing: loop {
            let mut stopped = false;
            let mut k = stack.len();
            while k > 0 {
                k -= 1;
                let opener = stack[k];
                if opener.recognizer != closer.recognizer {
                    continue;
                }
                let inner_start = out.partition_point(|t| t.span.start < opener.span.end);
                let pair = Pair {
                    opener: &opener,
                    closer: &closer,
                    inner: &out[inner_start..],
                    claimed,
                };
                match recognizer.is_valid_pair(&pair, ctx) {
                    Pairing::Skip => continue,
                    Pairing::RejectOpener => {
                        stack.remove(k);
                        stopped = true;
                        break;
                    }
                    Pairing::RejectCloser => {
                        stopped = true;
                        break;
                    }
                    Pairing::Accept => {
                        stack.truncate(k);
                        let inner = out.split_off(inner_start);
                        let resolved = recognizer.resolve_pair(&opener, &closer, inner, ctx);
                        if let Some(rest) = resolved.opener_remainder {
                            stack.push(rest);
                        }
                        emit(out, resolved.tokens, closer.recognizer);
                        match resolved.closer_remainder {
                            Some(rest) => {
                                closer = rest;
                                continue 'closing;
                            }
                            None => return,
                        }
                    }
                }
            }
            if !stopped && closer.kind.can_open() {
                stack.push(closer);
            }
            return;
        }
    }

    /// Text tokens for everything outside `tokens`, recursively.
    fn fill_text(&self, span: Span, tokens: Vec<InlineToken>) -> Vec<InlineToken> {
        let mut out = Vec::with_capacity(tokens.len() * 2 + 1);
        let mut pos = span.start;
        for mut token in tokens {
            if token.span.start > pos {
                out.extend(self.text(Span::new(pos, token.span.start)));
            }
            pos = pos.max(token.span.end);

            let mut children = std::mem::take(&mut token.children).into_iter().peekable();
            let mut filled = Vec::new();
            for inner in token.inner.clone() {
                let mut inside = Vec::new();
                while let Some(child) = children.next_if(|c| c.span.start < inner.end) {
                    if inner.contains(child.span) {
                        inside.push(child);
                    }
                }
                filled.extend(self.fill_text(inner, inside));
            }
            token.children = filled;
            out.push(token);
        }
        if pos < span.end {
            out.extend(self.text(Span::new(pos, span.end)));
        }
        out
    }

    fn text(&self, span: Span) -> Vec<InlineToken> {
        let fallback = self.registry.inline_fallback();
        let mut tokens = self
            .registry
            .inline(fallback)
            .resolve_single(&Delimiter::full(span), &self.ctx);
        for token in &mut tokens {
            token.recognizer = fallback;
        }
        tokens
    }
}

fn emit(out: &mut Vec<InlineToken>, tokens: Vec<InlineToken>, recognizer: usize) {
    for mut token in tokens {
        token.recognizer = recognizer;
        out.push(token);
    }
}

/// Joins adjacent text nodes.
fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(Node::Text(prev)), Node::Text(next)) = (out.last_mut(), &node) {
            prev.value.push_str(&next.value);
            if let (Some(a), Some(b)) = (prev.position, next.position) {
                prev.position = Some(Position {
                    start: a.start,
                    end: b.end,
                });
            }
            continue;
        }
        out.push(node);
    }
    out
}
