use std::sync::OnceLock;

use regex::Regex;

use crate::{
    ast::{Link, Literal, Node, NodeType, node_type},
    parsing::{
        content::{Span, chars::is_escaped},
        inline::{
            cursor::WindowText,
            recognizer::{
                DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer, ScanStep, Window,
            },
            types::{Delimiter, InlineToken},
        },
        payload::Payload,
    },
};

/// URI and email autolinks in angle brackets, e.g. `<https://x.org>`.
pub struct Autolink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutolinkData {
    pub email: bool,
}

fn uri_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^<[A-Za-z][A-Za-z0-9+.-]{1,31}:[^\x00-\x20<>]*>").expect("uri pattern is valid")
    })
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^<[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@",
            r"[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
            r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*>"
        ))
        .expect("email pattern is valid")
    })
}

/// Finds the next regex match starting at an unescaped `<` of the window.
///
/// Shared by the autolink and inline HTML scanners.
pub(crate) struct AngleScanner {
    text: Option<WindowText>,
    matcher: fn(&str) -> Option<usize>,
}

impl AngleScanner {
    pub(crate) fn new(matcher: fn(&str) -> Option<usize>) -> Self {
        Self {
            text: None,
            matcher,
        }
    }
}

impl DelimiterScanner for AngleScanner {
    fn next(&mut self, window: &Window<'_>) -> ScanStep {
        let reload = self
            .text
            .as_ref()
            .is_none_or(|t| t.span().end != window.span.end || t.span().start > window.span.start);
        if reload {
            self.text = Some(WindowText::new(window.points, window.span));
        }
        let Some(text) = self.text.as_ref() else {
            return ScanStep::Done;
        };

        let mut i = window.span.start;
        while let Some(at) = window.find(i, |c| c == '<') {
            if !is_escaped(window.points, at, text.span().start) {
                if let Some(bytes) = (self.matcher)(text.rest(at)) {
                    let end = text.index_after(at, bytes);
                    return ScanStep::Found(Delimiter::full(Span::new(at, end)));
                }
            }
            i = at + 1;
        }
        ScanStep::Done
    }
}

fn match_autolink(rest: &str) -> Option<usize> {
    uri_re()
        .find(rest)
        .or_else(|| email_re().find(rest))
        .map(|m| m.end())
}

impl InlineRecognizer for Autolink {
    fn name(&self) -> &'static str {
        "autolink"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn node_types(&self) -> &'static [NodeType] {
        &[node_type::AUTOLINK]
    }

    fn hooks(&self) -> InlineHooks {
        InlineHooks::SCAN | InlineHooks::SINGLE | InlineHooks::PARSE
    }

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(AngleScanner::new(match_autolink))
    }

    fn resolve_single(&self, delimiter: &Delimiter, ctx: &InlineContext<'_>) -> Vec<InlineToken> {
        let text = ctx.text(delimiter.span);
        let email = !uri_re().is_match(&text);
        vec![
            InlineToken::new(node_type::AUTOLINK, delimiter.span)
                .with_payload(Payload::new(AutolinkData { email })),
        ]
    }

    fn parse(&self, token: &InlineToken, _children: Vec<Node>, ctx: &InlineContext<'_>) -> Vec<Node> {
        let inner = Span::new(token.span.start + 1, token.span.end - 1);
        let value = ctx.text(inner);
        let email = token.payload.get::<AutolinkData>().is_some_and(|d| d.email);
        let url = if email {
            format!("mailto:{value}")
        } else {
            value.clone()
        };
        vec![Node::Link(Link {
            url,
            title: None,
            children: vec![Node::Text(Literal {
                value,
                position: ctx.position(inner),
            })],
            position: ctx.position(token.span),
        })]
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("<https://example.com/a?b=c>", Some(27))]
    #[case("<MAILTO:FOO@BAR.BAZ>", Some(20))]
    #[case("<foo@bar.example.com>", Some(21))]
    #[case("<a+b:c>", Some(7))]
    #[case("<m:abc>", None)]
    #[case("<https://a b>", None)]
    #[case("<foo\\+@bar.com>", None)]
    fn matches_autolinks(#[case] input: &str, #[case] end: Option<usize>) {
        assert_eq!(match_autolink(input), end);
    }
}
