//! # Block Recognizer Contract
//!
//! A block recognizer owns one or more token types and implements any subset
//! of the hooks below. Which subset is declared once through [`BlockHooks`];
//! the registry files the recognizer into the matching lifecycle phases and
//! the engines only ever call hooks that were declared.

use std::any::Any;

use bitflags::bitflags;

use crate::{
    ast::{Node, NodeType},
    error::Result,
    parsing::content::NodePoint,
};

use super::{
    classify::LineView,
    open::{Continuation, Interrupted, Interruption, Opened},
    parse::ParseContext,
    types::{BlockToken, BlockTree, TokenId},
};

bitflags! {
    /// Hooks a block recognizer implements.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct BlockHooks: u16 {
        /// `eat_opener`: starts a token on a fresh line remainder.
        const OPENER = 1 << 0;
        /// `eat_and_interrupt_previous_sibling`: ends an open leaf.
        const INTERRUPT = 1 << 1;
        /// `eat_continuation_text`: keeps an open token going.
        const CONTINUATION = 1 << 2;
        /// `eat_lazy_continuation_text`: accepts lazy lines.
        const LAZY_CONTINUATION = 1 << 3;
        /// `accepts_child`: may reject a would-be child.
        const ACCEPTS_CHILD = 1 << 4;
        /// `finalize`: runs when a token closes.
        const FINALIZE = 1 << 5;
        /// `transform_siblings`: post-match rewrite of sibling runs.
        const TRANSFORM_SIBLINGS = 1 << 6;
        /// `parse_meta`: builds a document-level lookup table.
        const PARSE_META = 1 << 7;
        /// `parse`: turns a token into AST nodes.
        const PARSE = 1 << 8;

        /// Hooks consulted while matching lines.
        const MATCH = Self::OPENER.bits()
            | Self::INTERRUPT.bits()
            | Self::CONTINUATION.bits()
            | Self::LAZY_CONTINUATION.bits()
            | Self::ACCEPTS_CHILD.bits()
            | Self::FINALIZE.bits();
    }
}

pub trait BlockRecognizer: Send + Sync {
    /// Unique recognizer name, used to disable it through configuration.
    fn name(&self) -> &'static str;

    /// Higher runs first. Equal priorities keep registration order.
    fn priority(&self) -> i32;

    /// Token types this recognizer produces and parses.
    fn node_types(&self) -> &'static [NodeType];

    fn hooks(&self) -> BlockHooks;

    /// Tokens opened by this recognizer own child tokens.
    fn is_containing(&self) -> bool {
        false
    }

    /// Token types this recognizer may interrupt. Interruption is further
    /// gated on priority: only leaves of equal or lower priority qualify.
    fn interruptable(&self) -> &[NodeType] {
        &[]
    }

    fn eat_opener(&self, _line: &LineView<'_>, _parent: &BlockToken) -> Option<Opened> {
        None
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        _line: &LineView<'_>,
        _prev: &mut BlockToken,
        _how: Interruption,
    ) -> Option<Interrupted> {
        None
    }

    fn eat_continuation_text(&self, _line: &LineView<'_>, _token: &mut BlockToken) -> Continuation {
        Continuation::NotMatched
    }

    fn eat_lazy_continuation_text(&self, _line: &LineView<'_>, _token: &mut BlockToken) -> bool {
        false
    }

    fn accepts_child(&self, _token: &BlockToken, _child: &BlockToken) -> bool {
        true
    }

    fn finalize(&self, _token: &mut BlockToken) {}

    fn transform_siblings(
        &self,
        siblings: Vec<TokenId>,
        _tree: &mut BlockTree,
        _points: &[NodePoint],
    ) -> Vec<TokenId> {
        siblings
    }

    fn parse_meta(&self, _tokens: &[&BlockToken]) -> Option<Box<dyn Any + Send + Sync>> {
        None
    }

    fn parse(
        &self,
        _token: &BlockToken,
        _children: Vec<Node>,
        _ctx: &ParseContext<'_>,
    ) -> Result<Vec<Node>> {
        Ok(Vec::new())
    }
}
