//! Links and images: inline (`[text](url "title")`), full (`[text][label]`),
//! collapsed (`[label][]`) and shortcut (`[label]`) references.
//!
//! Brackets are paired like any other delimiters; what follows the closing
//! bracket decides whether the pair is a link at all. Link text is matched
//! again afterwards with the lower tiers.

use crate::{
    ast::{self, Node, NodeType, ReferenceType, node_type},
    parsing::{
        content::{NodePoint, Span, chars::is_escaped},
        decode::decode,
        inline::{
            recognizer::{
                DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer, Pair, Pairing,
                Resolved, ScanStep, Window,
            },
            types::{Delimiter, DelimiterKind, InlineToken},
        },
        links::{
            DEFINITIONS, Definitions, is_label, normalize_label, scan_destination, scan_label,
            scan_title, skip_whitespace,
        },
        payload::Payload,
    },
};

pub struct Link;

impl Link {
    pub const OPEN: char = '[';
    pub const CLOSE: char = ']';
    pub const BANG: char = '!';
}

/// What follows the link text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTail {
    Inline {
        destination: Option<Span>,
        title: Option<Span>,
    },
    Reference {
        kind: ReferenceType,
        label: Span,
    },
}

struct BracketScanner;

impl DelimiterScanner for BracketScanner {
    fn next(&mut self, window: &Window<'_>) -> ScanStep {
        let floor = window.span.start;
        let mut i = floor;
        while let Some(at) = window.find(i, |c| c == Link::OPEN || c == Link::CLOSE || c == Link::BANG) {
            i = at + 1;
            let escaped = is_escaped(window.points, at, floor);
            match window.points[at].ch {
                Link::BANG => {
                    if at + 1 >= window.span.end || window.ch(at + 1) != Some(Link::OPEN) {
                        continue;
                    }
                    let delimiter = if escaped {
                        Delimiter::new(DelimiterKind::Opener, Span::new(at + 1, at + 2), Link::OPEN)
                    } else {
                        Delimiter::new(DelimiterKind::Opener, Span::new(at, at + 2), Link::BANG)
                    };
                    return ScanStep::Found(delimiter);
                }
                _ if escaped => continue,
                Link::OPEN => {
                    return ScanStep::Found(Delimiter::new(
                        DelimiterKind::Opener,
                        Span::new(at, at + 1),
                        Link::OPEN,
                    ));
                }
                _ => {
                    return ScanStep::Found(Delimiter::new(
                        DelimiterKind::Closer,
                        Span::new(at, at + 1),
                        Link::CLOSE,
                    ));
                }
            }
        }
        ScanStep::Done
    }
}

fn ch(points: &[NodePoint], i: usize, end: usize) -> Option<char> {
    (i < end).then(|| points[i].ch)
}

/// `(destination "title")` after the opening parenthesis at `i - 1`.
fn inline_tail(points: &[NodePoint], i: usize, end: usize) -> Option<(LinkTail, usize)> {
    let j = skip_whitespace(points, i, end);
    if ch(points, j, end) == Some(')') {
        let tail = LinkTail::Inline {
            destination: None,
            title: None,
        };
        return Some((tail, j + 1));
    }
    let (destination, after_dest) = scan_destination(points, j, end)?;
    let mut k = skip_whitespace(points, after_dest, end);
    let mut title = None;
    if k > after_dest {
        if let Some((span, after_title)) = scan_title(points, k, end) {
            title = Some(span);
            k = skip_whitespace(points, after_title, end);
        }
    }
    let tail = LinkTail::Inline {
        destination: Some(destination),
        title,
    };
    (ch(points, k, end) == Some(')')).then_some((tail, k + 1))
}

fn defined(ctx: &InlineContext<'_>, label: Span) -> bool {
    ctx.meta
        .get::<Definitions>(DEFINITIONS)
        .is_some_and(|defs| defs.contains(&ctx.text(label)))
}

/// The tail after the closing bracket at `after - 1`, and where it ends.
fn resolve_tail(ctx: &InlineContext<'_>, text: Span, after: usize) -> Option<(LinkTail, usize)> {
    let (points, end) = (ctx.points, ctx.bounds.end);
    if ch(points, after, end) == Some('(') {
        if let Some(found) = inline_tail(points, after + 1, end) {
            return Some(found);
        }
    }
    if let Some((label, next)) = scan_label(points, after, end) {
        let tail = LinkTail::Reference {
            kind: ReferenceType::Full,
            label,
        };
        return defined(ctx, label).then_some((tail, next));
    }
    let reference = |kind| LinkTail::Reference { kind, label: text };
    let known = is_label(points, text) && defined(ctx, text);
    if ch(points, after, end) == Some('[') && ch(points, after + 1, end) == Some(']') {
        return known.then_some((reference(ReferenceType::Collapsed), after + 2));
    }
    known.then_some((reference(ReferenceType::Shortcut), after))
}

fn contains_link(tokens: &[InlineToken]) -> bool {
    tokens.iter().any(|t| {
        t.is(node_type::LINK) || t.is(node_type::LINK_REFERENCE) || contains_link(&t.children)
    })
}

/// True when the raw brackets of `text` outside any token are balanced.
fn balanced(ctx: &InlineContext<'_>, text: Span, inner: &[InlineToken], claimed: &[InlineToken]) -> bool {
    let mut depth = 0usize;
    let mut i = text.start;
    let mut a = 0;
    let mut b = claimed.partition_point(|t| t.span.end <= text.start);
    while i < text.end {
        if a < inner.len() && inner[a].span.start <= i {
            i = i.max(inner[a].span.end);
            a += 1;
            continue;
        }
        if b < claimed.len() && claimed[b].span.start <= i {
            i = i.max(claimed[b].span.end);
            b += 1;
            continue;
        }
        match ctx.points[i].ch {
            '\\' => i += 1,
            Link::OPEN => depth += 1,
            Link::CLOSE => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
        i += 1;
    }
    depth == 0
}

impl InlineRecognizer for Link {
    fn name(&self) -> &'static str {
        "link"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[
            node_type::LINK,
            node_type::IMAGE,
            node_type::LINK_REFERENCE,
            node_type::IMAGE_REFERENCE,
        ]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SCAN | InlineHooks::PAIR | InlineHooks::PARSE
    }

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(BracketScanner)
    }

    fn is_valid_pair(&self, pair: &Pair<'_>, ctx: &InlineContext<'_>) -> Pairing {
        let image = pair.opener.marker == Link::BANG;
        if !image && contains_link(pair.inner) {
            return Pairing::RejectOpener;
        }
        let text = Span::new(pair.opener.span.end, pair.closer.span.start);
        let Some((_, end)) = resolve_tail(ctx, text, pair.closer.span.end) else {
            return Pairing::RejectOpener;
        };
        if !balanced(ctx, text, pair.inner, pair.claimed) {
            return Pairing::RejectOpener;
        }
        let k = pair.claimed.partition_point(|t| t.span.end <= end);
        if pair.claimed.get(k).is_some_and(|t| t.span.start < end) {
            return Pairing::RejectOpener;
        }
        Pairing::Accept
    }

    fn resolve_pair(
        &self,
        opener: &Delimiter,
        closer: &Delimiter,
        inner: Vec<InlineToken>,
        ctx: &InlineContext<'_>,
    ) -> Resolved {
        let text = Span::new(opener.span.end, closer.span.start);
        let Some((tail, end)) = resolve_tail(ctx, text, closer.span.end) else {
            return Resolved {
                tokens: inner,
                ..Resolved::default()
            };
        };
        let image = opener.marker == Link::BANG;
        let node_type = match (image, tail) {
            (false, LinkTail::Inline { .. }) => node_type::LINK,
            (true, LinkTail::Inline { .. }) => node_type::IMAGE,
            (false, LinkTail::Reference { .. }) => node_type::LINK_REFERENCE,
            (true, LinkTail::Reference { .. }) => node_type::IMAGE_REFERENCE,
        };
        let token = InlineToken::new(node_type, Span::new(opener.span.start, end))
            .with_inner(text)
            .with_children(inner)
            .with_payload(Payload::new(tail));
        Resolved {
            tokens: vec![token],
            ..Resolved::default()
        }
    }

    fn parse(&self, token: &InlineToken, children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        let Some(&tail) = token.payload.get::<LinkTail>() else {
            return children;
        };
        let position = ctx.position(token.span);
        let image = token.is(node_type::IMAGE) || token.is(node_type::IMAGE_REFERENCE);
        let alt = || children.iter().map(Node::plain_text).collect::<String>();

        let node = match tail {
            LinkTail::Inline { destination, title } => {
                let url = destination.map(|d| decode(&ctx.text(d))).unwrap_or_default();
                let title = title.map(|t| decode(&ctx.text(t)));
                if image {
                    Node::Image(ast::Image {
                        url,
                        title,
                        alt: alt(),
                        position,
                    })
                } else {
                    Node::Link(ast::Link {
                        url,
                        title,
                        children,
                        position,
                    })
                }
            }
            LinkTail::Reference { kind, label } => {
                let label = ctx.text(label);
                let identifier = normalize_label(&label);
                if image {
                    Node::ImageReference(ast::ImageReference {
                        identifier,
                        label,
                        reference_type: kind,
                        alt: alt(),
                        position,
                    })
                } else {
                    Node::LinkReference(ast::LinkReference {
                        identifier,
                        label,
                        reference_type: kind,
                        children,
                        position,
                    })
                }
            }
        };
        vec![node]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::parsing::{
        ParseOptions,
        blocks::types::Meta,
        content::{Content, slice_to_string},
        links::LinkTarget,
    };

    fn with_ctx<T>(input: &str, defined: &[&str], f: impl FnOnce(&InlineContext<'_>) -> T) -> T {
        let content = Content::new(input);
        let mut definitions = Definitions::default();
        for label in defined {
            definitions.insert_first(
                label,
                LinkTarget {
                    url: "/def".into(),
                    title: None,
                },
            );
        }
        let mut meta = Meta::default();
        meta.insert(DEFINITIONS, definitions);
        let options = ParseOptions::default();
        let ctx = InlineContext {
            points: content.points(),
            bounds: Span::new(0, content.len()),
            meta: &meta,
            options: &options,
        };
        f(&ctx)
    }

    /// Tail of a link whose text is `[a]` at the start of the input.
    fn tail(input: &str, defined: &[&str]) -> Option<(String, usize)> {
        with_ctx(input, defined, |ctx| {
            resolve_tail(ctx, Span::new(1, 2), 3).map(|(tail, end)| {
                let described = match tail {
                    LinkTail::Inline { destination, title } => format!(
                        "inline {:?} {:?}",
                        destination.map(|d| slice_to_string(ctx.points, d)),
                        title.map(|t| slice_to_string(ctx.points, t))
                    ),
                    LinkTail::Reference { kind, label } => {
                        format!("{kind:?} {}", slice_to_string(ctx.points, label))
                    }
                };
                (described, end)
            })
        })
    }

    #[rstest]
    #[case("[a](/u \"t\") x", &[], Some(("inline Some(\"/u\") Some(\"t\")", 11)))]
    #[case("[a]()", &[], Some(("inline None None", 5)))]
    #[case("[a](<b c>)", &[], Some(("inline Some(\"b c\") None", 10)))]
    #[case("[a](/u x)", &[], None)]
    #[case("[a][b]", &["b"], Some(("Full b", 6)))]
    #[case("[a][b]", &["a"], None)]
    #[case("[a][]", &["A"], Some(("Collapsed a", 5)))]
    #[case("[a] x", &["a"], Some(("Shortcut a", 3)))]
    #[case("[a](not a link)", &["a"], Some(("Shortcut a", 3)))]
    #[case("[a]", &[], None)]
    fn resolves_tails(
        #[case] input: &str,
        #[case] defined: &[&str],
        #[case] expected: Option<(&str, usize)>,
    ) {
        let expected = expected.map(|(s, end)| (s.to_string(), end));
        assert_eq!(tail(input, defined), expected);
    }

    #[test]
    fn brackets_must_balance_outside_tokens() {
        with_ctx("[a]b] [c]", &[], |ctx| {
            assert!(!balanced(ctx, Span::new(0, 5), &[], &[]));
            assert!(balanced(ctx, Span::new(0, 3), &[], &[]));
            let code = InlineToken::new(node_type::INLINE_CODE, Span::new(3, 5));
            assert!(balanced(ctx, Span::new(0, 5), &[], &[code]));
        });
    }

    #[test]
    fn escaped_bang_still_opens_a_link() {
        let content = Content::new("\\![a]");
        let step = BracketScanner.next(&Window {
            points: content.points(),
            span: Span::new(0, content.len()),
        });
        let ScanStep::Found(d) = step else {
            panic!("expected an opener");
        };
        assert_eq!((d.span.start, d.span.end, d.marker), (2, 3, Link::OPEN));
    }
}
