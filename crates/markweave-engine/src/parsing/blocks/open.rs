//! Outcomes of the block recognizer match hooks.

use super::{content::ContentLine, types::BlockToken};

/// A token proposed by an opener or interrupt hook.
#[derive(Debug)]
pub struct Opened {
    pub token: BlockToken,
    /// What is left of the line for nested openers. Leaves return an
    /// exhausted remainder.
    pub rest: ContentLine,
    /// The token is complete on its opening line (thematic break, ATX
    /// heading) and is closed right away.
    pub saturated: bool,
}

impl Opened {
    pub fn new(token: BlockToken, rest: ContentLine) -> Self {
        Self {
            token,
            rest,
            saturated: false,
        }
    }

    pub fn saturated(token: BlockToken, rest: ContentLine) -> Self {
        Self {
            token,
            rest,
            saturated: true,
        }
    }
}

/// Context of an interruption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// The open leaf is the previous sibling: every container above it
    /// matched the line.
    Sibling,
    /// A container above the open leaf failed to match, so the line would
    /// otherwise be a lazy continuation of it.
    Lazy,
}

/// Result of a successful interruption.
#[derive(Debug)]
pub struct Interrupted {
    pub opened: Opened,
    /// The interrupted leaf was fully absorbed (e.g. a setext underline
    /// turning a paragraph into a heading) and is removed from the tree.
    pub drop_previous: bool,
}

impl Interrupted {
    pub fn new(opened: Opened) -> Self {
        Self {
            opened,
            drop_previous: false,
        }
    }

    pub fn replacing(opened: Opened) -> Self {
        Self {
            opened,
            drop_previous: true,
        }
    }
}

/// Answer of a continuation hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// The line belongs to the token, which stays open; `rest` is what is
    /// left for children.
    Opening { rest: ContentLine },
    /// The line belongs to the token and completes it.
    Closing { rest: ContentLine },
    /// The line does not belong to the token.
    NotMatched,
}
