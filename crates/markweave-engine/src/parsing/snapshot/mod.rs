//! # Snapshot Testing Support
//!
//! Utilities for testing the parser via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`normalize`**: Converts a parsed [`Node`](crate::ast::Node) tree to a
//!   stable, serializable [`Snap`] and to a compact indented outline for
//!   `insta` snapshot testing
//! - **`invariants`**: Runtime checks for parser correctness (positions in
//!   bounds, child positions contained in their parent, siblings in order and
//!   disjoint)
//!
//! ## Testing Strategy
//!
//! Parsing behavior is pinned by snapshot tests rather than a separate formal
//! grammar. Outlines list node types and their attributes; positions are left
//! to the invariant checks so snapshots stay readable.

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{Snap, normalize, outline};
