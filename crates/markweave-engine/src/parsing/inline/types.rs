use crate::{
    ast::NodeType,
    parsing::{content::Span, payload::Payload},
};

/// Role a delimiter can play during pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Opener,
    Closer,
    /// May open or close (e.g. an emphasis run flanked on both sides).
    Both,
    /// Complete on its own; resolved without pairing.
    Full,
}

impl DelimiterKind {
    pub fn can_open(self) -> bool {
        matches!(self, DelimiterKind::Opener | DelimiterKind::Both)
    }

    pub fn can_close(self) -> bool {
        matches!(self, DelimiterKind::Closer | DelimiterKind::Both)
    }
}

/// A candidate inline marker awaiting pairing or resolution.
///
/// Spans index into the phrasing buffer of the block being matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub kind: DelimiterKind,
    pub span: Span,
    /// Marker character, e.g. `*`, `[` or `!` for an image opener.
    pub marker: char,
    /// Length of the run this delimiter was cut from; stays fixed when a
    /// pairing consumes part of the delimiter.
    pub run: usize,
    pub(crate) recognizer: usize,
}

impl Delimiter {
    pub fn new(kind: DelimiterKind, span: Span, marker: char) -> Self {
        Self {
            kind,
            span,
            marker,
            run: span.len(),
            recognizer: 0,
        }
    }

    pub fn full(span: Span) -> Self {
        Self::new(DelimiterKind::Full, span, '\0')
    }

    /// The same delimiter narrowed to `span`, e.g. what is left of an
    /// emphasis run after a pairing.
    pub fn narrowed(&self, span: Span) -> Self {
        Self { span, ..*self }
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// A resolved inline token.
///
/// Tokens form an interval forest: children lie inside one of the token's
/// `inner` spans, siblings are disjoint and ordered.
#[derive(Debug)]
pub struct InlineToken {
    pub node_type: NodeType,
    pub span: Span,
    /// Sub-spans holding nested content that is matched recursively, e.g.
    /// the text of a link. Everything else inside `span` is syntax.
    pub inner: Vec<Span>,
    pub children: Vec<InlineToken>,
    pub payload: Payload,
    pub(crate) recognizer: usize,
    pub(crate) excavated: bool,
}

impl InlineToken {
    pub fn new(node_type: NodeType, span: Span) -> Self {
        Self {
            node_type,
            span,
            inner: Vec::new(),
            children: Vec::new(),
            payload: Payload::none(),
            recognizer: 0,
            excavated: false,
        }
    }

    pub fn with_inner(mut self, inner: Span) -> Self {
        self.inner.push(inner);
        self
    }

    pub fn with_children(mut self, children: Vec<InlineToken>) -> Self {
        self.children = children;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn is(&self, ty: &str) -> bool {
        self.node_type == ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_keeps_the_original_run() {
        let d = Delimiter::new(DelimiterKind::Both, Span::new(3, 6), '*');
        let rest = d.narrowed(Span::new(3, 4));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.run, 3);
        assert!(rest.kind.can_open() && rest.kind.can_close());
        assert!(!DelimiterKind::Full.can_open());
    }
}
