//! # Block Parsing
//!
//! Block structure is built by a line-driven container stack, in three
//! phases.
//!
//! ## Parsing Phases
//!
//! 1. **Match** (`builder`): every physical line is offered to the chain of
//!    open tokens, then to openers, then to the fallback. Recognizers see the
//!    line through a [`LineView`]: the remainder left by the containers
//!    matched so far.
//!
//! 2. **Post-match** (`post`): recognizers rewrite sibling runs (lists are
//!    grouped from items, definitions peeled off paragraphs) and the meta
//!    pre-pass builds document-level tables.
//!
//! 3. **Parse** (`parse`): the token tree becomes AST nodes, bottom-up.
//!
//! ## Modules
//!
//! - **`types`**: the token arena (`BlockTree`, `BlockToken`, `TokenId`)
//! - **`content`**: `ContentLine` remainders and phrasing buffers
//! - **`classify`**: `LineView`, column-aware access to a line remainder
//! - **`open`**: hook outcomes (`Opened`, `Interrupted`, `Continuation`)
//! - **`recognizer`**: the `BlockRecognizer` contract
//! - **`kinds`**: the GFM block recognizers, each owning its syntax
//!
//! ## Key Invariants
//!
//! - Nesting depth is unbounded (lists in blockquotes in lists, etc.)
//! - Fenced code blocks are raw zones: no block/inline parsing inside
//! - A closed token never changes again during matching

pub mod builder;
pub mod classify;
pub mod content;
pub mod kinds;
pub mod open;
pub mod parse;
pub mod post;
pub mod recognizer;
pub mod types;

pub use builder::BlockMatcher;
pub use classify::LineView;
pub use content::ContentLine;
pub use open::{Continuation, Interrupted, Interruption, Opened};
pub use parse::ParseContext;
pub use recognizer::{BlockHooks, BlockRecognizer};
pub use types::{BlockToken, BlockTree, Meta, TokenId};
