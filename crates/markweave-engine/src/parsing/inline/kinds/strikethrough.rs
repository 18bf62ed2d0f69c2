use crate::{
    ast::{Node, NodeType, Parent, node_type},
    parsing::{
        content::Span,
        inline::{
            recognizer::{
                DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer, Pair, Pairing,
                Resolved, ScanStep, Window,
            },
            types::{Delimiter, InlineToken},
        },
    },
};

use super::emphasis::{Flanking, marker_run};

/// GFM strikethrough: `~a~` or `~~a~~`, closed by a run of equal length.
pub struct Strikethrough;

impl Strikethrough {
    pub const TILDE: char = '~';
    pub const MAX_RUN: usize = 2;
}

struct TildeScanner;

impl DelimiterScanner for TildeScanner {
    fn next(&mut self, window: &Window<'_>) -> ScanStep {
        let mut i = window.span.start;
        while let Some(at) = window.find(i, |c| c == Strikethrough::TILDE) {
            let run = marker_run(window, at, Strikethrough::TILDE);
            i = run.end.max(at + 1);
            if run.is_empty() || run.len() > Strikethrough::MAX_RUN {
                continue;
            }
            if let Some(kind) = Flanking::of(window.points, run).kind() {
                return ScanStep::Found(Delimiter::new(kind, run, Strikethrough::TILDE));
            }
        }
        ScanStep::Done
    }
}

impl InlineRecognizer for Strikethrough {
    fn name(&self) -> &'static str {
        "strikethrough"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::DELETE]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SCAN | InlineHooks::PAIR | InlineHooks::PARSE
    }

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(TildeScanner)
    }

    fn is_valid_pair(&self, pair: &Pair<'_>, _ctx: &InlineContext<'_>) -> Pairing {
        if pair.opener.len() == pair.closer.len() {
            Pairing::Accept
        } else {
            Pairing::Skip
        }
    }

    fn resolve_pair(
        &self,
        opener: &Delimiter,
        closer: &Delimiter,
        inner: Vec<InlineToken>,
        _ctx: &InlineContext<'_>,
    ) -> Resolved {
        let token = InlineToken::new(node_type::DELETE, Span::new(opener.span.start, closer.span.end))
            .with_inner(Span::new(opener.span.end, closer.span.start))
            .with_children(inner);
        Resolved {
            tokens: vec![token],
            ..Resolved::default()
        }
    }

    fn parse(&self, token: &InlineToken, children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        vec![Node::Delete(Parent {
            children,
            position: ctx.position(token.span),
        })]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parsing::content::Content;

    fn runs(input: &str) -> Vec<(usize, usize)> {
        let content = Content::new(input);
        let mut found = Vec::new();
        let mut pos = 0;
        while let ScanStep::Found(d) = TildeScanner.next(&Window {
            points: content.points(),
            span: Span::new(pos, content.len()),
        }) {
            found.push((d.span.start, d.span.end));
            pos = d.span.end;
        }
        found
    }

    #[test]
    fn long_runs_are_not_delimiters() {
        assert_eq!(runs("~~a~~"), vec![(0, 2), (3, 5)]);
        assert_eq!(runs("~~~a~~~"), vec![]);
        assert_eq!(runs("a ~ b"), vec![]);
    }
}
