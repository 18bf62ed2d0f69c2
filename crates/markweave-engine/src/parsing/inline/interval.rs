//! The inline token forest as an interval structure.
//!
//! Tokens of one level are disjoint and ordered by start; a token's children
//! lie inside one of its `inner` spans. Higher tiers claim spans first, and
//! lower tiers only see the gaps between claimed tokens.

use log::trace;

use crate::parsing::content::Span;

use super::types::InlineToken;

/// Non-empty sub-spans of `span` not covered by any token of `forest`.
pub fn gaps(span: Span, forest: &[InlineToken]) -> Vec<Span> {
    let mut out = Vec::new();
    let mut pos = span.start;
    for token in forest {
        if token.span.end <= span.start || token.span.start >= span.end {
            continue;
        }
        if token.span.start > pos {
            out.push(Span::new(pos, token.span.start));
        }
        pos = pos.max(token.span.end);
    }
    if pos < span.end {
        out.push(Span::new(pos, span.end));
    }
    out
}

/// Merges the tokens a tier produced into the forest built so far.
///
/// Both inputs are ordered and internally disjoint. A forest token lying
/// inside a produced token becomes its descendant when it falls inside one
/// of its inner spans, and is dropped when it sits in syntax (e.g. inside a
/// link destination). Forest tokens straddling a produced token are dropped.
pub fn fold(forest: Vec<InlineToken>, produced: Vec<InlineToken>) -> Vec<InlineToken> {
    if produced.is_empty() {
        return forest;
    }
    let mut out = Vec::with_capacity(forest.len() + produced.len());
    let mut forest = forest.into_iter().peekable();
    for mut token in produced {
        while let Some(before) = forest.next_if(|f| f.span.end <= token.span.start) {
            out.push(before);
        }
        while let Some(inside) = forest.next_if(|f| f.span.start < token.span.end) {
            if token.span.contains(inside.span) {
                adopt(&mut token, inside);
            } else {
                trace!(
                    "{} {}..{} straddles {}, dropped",
                    inside.node_type, inside.span.start, inside.span.end, token.node_type
                );
            }
        }
        out.push(token);
    }
    out.extend(forest);
    out
}

/// Places `token` under the deepest descendant of `parent` containing it.
fn adopt(parent: &mut InlineToken, token: InlineToken) {
    let at = parent
        .children
        .partition_point(|c| c.span.start <= token.span.start);
    if at > 0 && parent.children[at - 1].span.contains(token.span) {
        adopt(&mut parent.children[at - 1], token);
        return;
    }
    if parent.inner.iter().any(|inner| inner.contains(token.span)) {
        parent.children.insert(at, token);
    }
}

/// True when `tokens` are ordered, disjoint, inside `span`, and every
/// token's children satisfy the same inside one of its inner spans.
pub fn is_well_formed(span: Span, tokens: &[InlineToken]) -> bool {
    let mut pos = span.start;
    for token in tokens {
        if token.span.start < pos || !span.contains(token.span) {
            return false;
        }
        pos = token.span.end;
        let children_ok = token.children.iter().all(|child| {
            token.inner.iter().any(|inner| inner.contains(child.span))
        });
        if !children_ok || !is_well_formed(token.span, &token.children) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::node_type;

    fn token(start: usize, end: usize) -> InlineToken {
        InlineToken::new(node_type::INLINE_CODE, Span::new(start, end))
    }

    fn parent(start: usize, end: usize) -> InlineToken {
        InlineToken::new(node_type::EMPHASIS, Span::new(start, end))
            .with_inner(Span::new(start + 1, end - 1))
    }

    fn spans(tokens: &[InlineToken]) -> Vec<(usize, usize)> {
        tokens.iter().map(|t| (t.span.start, t.span.end)).collect()
    }

    #[test]
    fn gaps_skip_claimed_tokens() {
        let forest = vec![token(2, 4), token(4, 6), token(8, 10)];
        assert_eq!(
            gaps(Span::new(0, 10), &forest),
            vec![Span::new(0, 2), Span::new(6, 8)]
        );
        assert!(gaps(Span::new(2, 6), &forest).is_empty());
    }

    #[test]
    fn fold_adopts_contained_tokens() {
        let forest = vec![token(0, 2), token(4, 6), token(12, 14)];
        let produced = vec![parent(3, 10)];
        let folded = fold(forest, produced);
        assert_eq!(spans(&folded), vec![(0, 2), (3, 10), (12, 14)]);
        assert_eq!(spans(&folded[1].children), vec![(4, 6)]);
        assert!(is_well_formed(Span::new(0, 14), &folded));
    }

    #[test]
    fn fold_nests_into_deepest_child() {
        let inner = parent(4, 12);
        let outer = parent(3, 13).with_children(vec![inner]);
        let folded = fold(vec![token(6, 8)], vec![outer]);
        assert_eq!(spans(&folded[0].children[0].children), vec![(6, 8)]);
    }

    #[test]
    fn fold_drops_tokens_in_syntax_and_straddlers() {
        let link = InlineToken::new(node_type::LINK, Span::new(0, 10)).with_inner(Span::new(1, 3));
        let folded = fold(vec![token(5, 7), token(9, 12)], vec![link]);
        assert_eq!(spans(&folded), vec![(0, 10)]);
        assert!(folded[0].children.is_empty());
    }

    #[test]
    fn overlapping_tokens_are_not_well_formed() {
        assert!(!is_well_formed(Span::new(0, 10), &[token(0, 4), token(3, 6)]));
        assert!(!is_well_formed(Span::new(0, 5), &[token(3, 6)]));
    }
}
