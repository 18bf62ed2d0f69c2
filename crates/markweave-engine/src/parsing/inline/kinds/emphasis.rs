//! Emphasis and strong emphasis with `*` and `_`.

use crate::{
    ast::{Node, NodeType, Parent, node_type},
    parsing::{
        content::{
            NodePoint, Span,
            chars::{is_escaped, is_punctuation, is_whitespace},
        },
        inline::{
            recognizer::{
                DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer, Pair, Pairing,
                Resolved, ScanStep, Window,
            },
            types::{Delimiter, DelimiterKind, InlineToken},
        },
    },
};

pub struct Emphasis;

impl Emphasis {
    pub const STAR: char = '*';
    pub const UNDERSCORE: char = '_';
}

/// Flanking of a delimiter run, judged by the characters around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flanking {
    pub left: bool,
    pub right: bool,
    pub prev_punct: bool,
    pub next_punct: bool,
}

impl Flanking {
    /// Characters outside the buffer count as whitespace.
    pub fn of(points: &[NodePoint], span: Span) -> Self {
        let prev = span
            .start
            .checked_sub(1)
            .and_then(|i| points.get(i))
            .map_or(' ', |p| p.ch);
        let next = points.get(span.end).map_or(' ', |p| p.ch);
        let (prev_ws, next_ws) = (is_whitespace(prev), is_whitespace(next));
        let (prev_punct, next_punct) = (is_punctuation(prev), is_punctuation(next));
        Self {
            left: !next_ws && (!next_punct || prev_ws || prev_punct),
            right: !prev_ws && (!prev_punct || next_ws || next_punct),
            prev_punct,
            next_punct,
        }
    }

    /// Delimiter role of a `*`-like run.
    pub fn kind(&self) -> Option<DelimiterKind> {
        match (self.left, self.right) {
            (true, true) => Some(DelimiterKind::Both),
            (true, false) => Some(DelimiterKind::Opener),
            (false, true) => Some(DelimiterKind::Closer),
            (false, false) => None,
        }
    }

    /// Delimiter role of an `_` run, which may not open or close inside a
    /// word.
    pub fn underscore_kind(&self) -> Option<DelimiterKind> {
        let open = self.left && (!self.right || self.prev_punct);
        let close = self.right && (!self.left || self.next_punct);
        match (open, close) {
            (true, true) => Some(DelimiterKind::Both),
            (true, false) => Some(DelimiterKind::Opener),
            (false, true) => Some(DelimiterKind::Closer),
            (false, false) => None,
        }
    }
}

/// The run of `marker` starting at `start`, clipped to the window, with a
/// leading escaped marker dropped.
pub fn marker_run(window: &Window<'_>, start: usize, marker: char) -> Span {
    let mut end = start;
    while end < window.span.end && window.ch(end) == Some(marker) {
        end += 1;
    }
    let start = if is_escaped(window.points, start, window.span.start) {
        start + 1
    } else {
        start
    };
    Span::new(start, end)
}

struct EmphasisScanner;

impl DelimiterScanner for EmphasisScanner {
    fn next(&mut self, window: &Window<'_>) -> ScanStep {
        let mut i = window.span.start;
        while let Some(at) = window.find(i, |c| c == Emphasis::STAR || c == Emphasis::UNDERSCORE) {
            let marker = window.points[at].ch;
            let run = marker_run(window, at, marker);
            i = run.end;
            if run.is_empty() {
                continue;
            }
            let flanking = Flanking::of(window.points, run);
            let kind = if marker == Emphasis::STAR {
                flanking.kind()
            } else {
                flanking.underscore_kind()
            };
            if let Some(kind) = kind {
                return ScanStep::Found(Delimiter::new(kind, run, marker));
            }
        }
        ScanStep::Done
    }
}

impl InlineRecognizer for Emphasis {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::EMPHASIS, node_type::STRONG]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SCAN | InlineHooks::PAIR | InlineHooks::PARSE
    }

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(EmphasisScanner)
    }

    fn is_valid_pair(&self, pair: &Pair<'_>, _ctx: &InlineContext<'_>) -> Pairing {
        let (opener, closer) = (pair.opener, pair.closer);
        if opener.marker != closer.marker {
            return Pairing::Skip;
        }
        let either_both =
            opener.kind == DelimiterKind::Both || closer.kind == DelimiterKind::Both;
        if either_both
            && (opener.run + closer.run) % 3 == 0
            && !(opener.run % 3 == 0 && closer.run % 3 == 0)
        {
            return Pairing::Skip;
        }
        Pairing::Accept
    }

    fn resolve_pair(
        &self,
        opener: &Delimiter,
        closer: &Delimiter,
        inner: Vec<InlineToken>,
        _ctx: &InlineContext<'_>,
    ) -> Resolved {
        let used = if opener.len() >= 2 && closer.len() >= 2 { 2 } else { 1 };
        let node_type = if used == 2 {
            node_type::STRONG
        } else {
            node_type::EMPHASIS
        };
        let span = Span::new(opener.span.end - used, closer.span.start + used);
        let token = InlineToken::new(node_type, span)
            .with_inner(Span::new(opener.span.end, closer.span.start))
            .with_children(inner);

        Resolved {
            tokens: vec![token],
            opener_remainder: (opener.len() > used)
                .then(|| opener.narrowed(Span::new(opener.span.start, opener.span.end - used))),
            closer_remainder: (closer.len() > used)
                .then(|| closer.narrowed(Span::new(closer.span.start + used, closer.span.end))),
        }
    }

    fn parse(&self, token: &InlineToken, children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        let parent = Parent {
            children,
            position: ctx.position(token.span),
        };
        vec![if token.is(node_type::STRONG) {
            Node::Strong(parent)
        } else {
            Node::Emphasis(parent)
        }]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::parsing::{ParseOptions, blocks::types::Meta, content::Content};

    fn first(input: &str) -> Option<(usize, usize, DelimiterKind)> {
        let content = Content::new(input);
        match EmphasisScanner.next(&Window {
            points: content.points(),
            span: Span::new(0, content.len()),
        }) {
            ScanStep::Found(d) => Some((d.span.start, d.span.end, d.kind)),
            ScanStep::Done => None,
        }
    }

    #[rstest]
    #[case("**a", Some((0, 2, DelimiterKind::Opener)))]
    #[case("a* b", Some((1, 2, DelimiterKind::Closer)))]
    #[case("a*b", Some((1, 2, DelimiterKind::Both)))]
    #[case("a_b_ c", Some((3, 4, DelimiterKind::Closer)))]
    #[case("a * b", None)]
    #[case("\\**a", Some((2, 3, DelimiterKind::Opener)))]
    #[case("\"_a", Some((1, 2, DelimiterKind::Opener)))]
    fn classifies_runs(#[case] input: &str, #[case] expected: Option<(usize, usize, DelimiterKind)>) {
        assert_eq!(first(input), expected);
    }

    #[test]
    fn mod_three_rule_skips_mixed_runs() {
        let meta = Meta::default();
        let options = ParseOptions::default();
        let ctx = InlineContext {
            points: &[],
            bounds: Span::new(0, 0),
            meta: &meta,
            options: &options,
        };
        let opener = Delimiter::new(DelimiterKind::Opener, Span::new(0, 1), '*');
        let both = Delimiter::new(DelimiterKind::Both, Span::new(3, 5), '*');
        let pair = Pair {
            opener: &opener,
            closer: &both,
            inner: &[],
            claimed: &[],
        };
        assert_eq!(Emphasis.is_valid_pair(&pair, &ctx), Pairing::Skip);

        let underscore = Delimiter::new(DelimiterKind::Closer, Span::new(3, 4), '_');
        let pair = Pair {
            opener: &opener,
            closer: &underscore,
            inner: &[],
            claimed: &[],
        };
        assert_eq!(Emphasis.is_valid_pair(&pair, &ctx), Pairing::Skip);
    }
}
