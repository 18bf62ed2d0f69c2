//! # Inline Parsing
//!
//! Delimiter-driven inline matching over the phrasing buffer of one block.
//!
//! ## Architecture
//!
//! Recognizers are grouped into tiers by priority. For each tier, in
//! descending order:
//!
//! 1. **Collect**: every member scans the spans not yet claimed by a higher
//!    tier and proposes delimiters (`Opener`, `Closer`, `Both`, `Full`).
//! 2. **Pair**: a stack of openers is matched against closers; the owning
//!    recognizer validates and resolves each pair.
//! 3. **Fold**: the resolved tokens are merged into the interval forest by
//!    containment.
//!
//! Tokens with inner spans (link text, emphasis content) are then excavated:
//! their inner spans are matched again with the tiers below their owner.
//! Spans nobody claimed become text, and the forest is parsed bottom-up.
//!
//! ## Modules
//!
//! - **`types`**: `Delimiter` and `InlineToken`
//! - **`recognizer`**: the `InlineRecognizer` contract and scanner protocol
//! - **`interval`**: gap computation and the containment fold
//! - **`cursor`**: `WindowText`, the string view used by regex scanners
//! - **`parser`**: `InlineMatcher`, the tier loop
//! - **`kinds`**: the GFM inline recognizers
//!
//! ## Raw Zone Precedence
//!
//! Code spans take precedence: `` `[not a link](x)` `` is a single code
//! span, since the link tier only sees what the code tier left unclaimed.

pub mod cursor;
pub mod interval;
pub mod kinds;
pub mod parser;
pub mod recognizer;
pub mod types;

pub use parser::InlineMatcher;
pub use recognizer::{
    DelimiterScanner, InlineContext, InlineHooks, InlineRecognizer, Pair, Pairing, Resolved,
    ScanStep, Window,
};
pub use types::{Delimiter, DelimiterKind, InlineToken};
