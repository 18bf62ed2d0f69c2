//! # Inline Kinds
//!
//! The GFM inline recognizers. Each owns its delimiter characters and its
//! pairing rules; the engine never hardcodes a marker.
//!
//! ## Tiers
//!
//! - **100**: `CodeSpan`, `Autolink`, `InlineHtml`, `HardBreak` (resolved
//!   on their own, raw inside)
//! - **90**: `Link` (brackets and what follows them)
//! - **50**: `Emphasis`, `Strikethrough` (flanking runs)
//! - fallback: `Text`

pub mod autolink;
pub mod code_span;
pub mod emphasis;
pub mod hard_break;
pub mod html;
pub mod link;
pub mod strikethrough;
pub mod text;

pub use autolink::Autolink;
pub use code_span::CodeSpan;
pub use emphasis::Emphasis;
pub use hard_break::HardBreak;
pub use html::InlineHtml;
pub use link::Link;
pub use strikethrough::Strikethrough;
pub use text::Text;
