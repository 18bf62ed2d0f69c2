//! # Inline Recognizer Contract
//!
//! Inline recognizers discover delimiters through a resumable scanner and
//! turn them into tokens, either on their own (`resolve_single`) or by
//! pairing an opener with a closer (`is_valid_pair` / `resolve_pair`).

use bitflags::bitflags;

use crate::{
    ast::{Node, NodeType},
    parsing::{
        ParseOptions,
        blocks::types::Meta,
        content::{NodePoint, Position, Span, position_of, slice_to_string},
    },
};

use super::types::{Delimiter, InlineToken};

bitflags! {
    /// Hooks an inline recognizer implements.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct InlineHooks: u8 {
        /// `scanner`: contributes delimiters.
        const SCAN = 1 << 0;
        /// `resolve_single`: resolves `Full` delimiters.
        const SINGLE = 1 << 1;
        /// `is_valid_pair` and `resolve_pair`.
        const PAIR = 1 << 2;
        /// `parse`: turns tokens into AST nodes.
        const PARSE = 1 << 3;
    }
}

/// Read-only state of one inline pass.
#[derive(Clone, Copy)]
pub struct InlineContext<'a> {
    /// The phrasing buffer every span indexes into.
    pub points: &'a [NodePoint],
    /// The span being matched; constructs must not reach past its end.
    pub bounds: Span,
    pub meta: &'a Meta,
    pub options: &'a ParseOptions,
}

impl<'a> InlineContext<'a> {
    pub fn ch(&self, index: usize) -> Option<char> {
        self.points.get(index).map(|p| p.ch)
    }

    pub fn text(&self, span: Span) -> String {
        slice_to_string(self.points, span)
    }

    /// Source position of a span, unless positions are switched off.
    pub fn position(&self, span: Span) -> Option<Position> {
        self.options
            .reserve_position
            .then(|| position_of(self.points, span))
    }
}

/// An un-claimed sub-span handed to a scanner.
#[derive(Clone, Copy)]
pub struct Window<'a> {
    pub points: &'a [NodePoint],
    pub span: Span,
}

impl Window<'_> {
    pub fn ch(&self, index: usize) -> Option<char> {
        self.points.get(index).map(|p| p.ch)
    }

    /// Index of the first code point matching `pred` inside the window, at
    /// or after `from`.
    pub fn find(&self, from: usize, pred: impl Fn(char) -> bool) -> Option<usize> {
        (from.max(self.span.start)..self.span.end).find(|&i| pred(self.points[i].ch))
    }
}

/// One step of a resumable scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    /// The next delimiter at or after the window start. It must lie inside
    /// the window.
    Found(Delimiter),
    /// Nothing more inside this window.
    Done,
}

/// Scanner state of one recognizer over one phrasing buffer.
///
/// The engine calls `next` repeatedly with windows that only ever move
/// forward, so a scanner may cache what it learned about the buffer.
pub trait DelimiterScanner {
    fn next(&mut self, window: &Window<'_>) -> ScanStep;
}

/// A scanner that never finds anything.
pub struct NoDelimiters;

impl DelimiterScanner for NoDelimiters {
    fn next(&mut self, _window: &Window<'_>) -> ScanStep {
        ScanStep::Done
    }
}

/// An opener/closer candidate pair.
pub struct Pair<'a> {
    pub opener: &'a Delimiter,
    pub closer: &'a Delimiter,
    /// Tokens resolved between the two during this pass.
    pub inner: &'a [InlineToken],
    /// Tokens claimed by higher-priority tiers, in order.
    pub claimed: &'a [InlineToken],
}

/// Verdict of a pairing-validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    Accept,
    /// Not this opener; keep looking further back.
    Skip,
    /// The opener is deactivated for good and the closer stays literal.
    RejectOpener,
    /// The closer stays literal; the opener remains available.
    RejectCloser,
}

/// Outcome of `resolve_pair`.
#[derive(Debug, Default)]
pub struct Resolved {
    pub tokens: Vec<InlineToken>,
    /// Unused part of the opener, still active for further pairing.
    pub opener_remainder: Option<Delimiter>,
    /// Unused part of the closer, paired again right away.
    pub closer_remainder: Option<Delimiter>,
}

pub trait InlineRecognizer: Send + Sync {
    /// Unique recognizer name, used to disable it through configuration.
    fn name(&self) -> &'static str;

    /// Recognizers of equal priority form one tier.
    fn priority(&self) -> i32;

    fn node_types(&self) -> &'static [NodeType];

    fn hooks(&self) -> InlineHooks;

    fn scanner(&self) -> Box<dyn DelimiterScanner> {
        Box::new(NoDelimiters)
    }

    fn resolve_single(&self, _delimiter: &Delimiter, _ctx: &InlineContext<'_>) -> Vec<InlineToken> {
        Vec::new()
    }

    fn is_valid_pair(&self, _pair: &Pair<'_>, _ctx: &InlineContext<'_>) -> Pairing {
        Pairing::Skip
    }

    fn resolve_pair(
        &self,
        _opener: &Delimiter,
        _closer: &Delimiter,
        _inner: Vec<InlineToken>,
        _ctx: &InlineContext<'_>,
    ) -> Resolved {
        Resolved::default()
    }

    fn parse(&self, _token: &InlineToken, _children: Vec<Node>, _ctx: &InlineContext<'_>) -> Vec<Node> {
        Vec::new()
    }
}
