//! # Parsing
//!
//! Text becomes an mdast-style [`Node`] tree in four steps:
//!
//! 1. [`Content`] indexes the input as code points with positions.
//! 2. [`BlockMatcher`] feeds every line through the block recognizers and
//!    builds the block token tree.
//! 3. Post-match rewrites sibling runs and collects document metadata
//!    (link reference definitions).
//! 4. The parse phase turns block tokens into nodes; phrasing leaves run the
//!    inline engine over their content on the way.
//!
//! Which syntax is recognized is decided entirely by the [`Registry`].
//! [`gfm_registry`] assembles the GitHub Flavored Markdown set.

pub mod blocks;
pub mod content;
pub mod decode;
pub mod html;
pub mod inline;
pub mod links;
pub mod payload;
pub mod registry;
pub mod snapshot;

#[cfg(test)]
mod tests;

use log::debug;
use xi_rope::Rope;

use crate::{ast::Node, error::Result};

use blocks::{
    BlockMatcher,
    kinds::{
        BlankLine, BlockQuote, CodeFence, Definition, Heading, HtmlBlock, IndentedCode, List,
        Paragraph, SetextHeading, Table, ThematicBreak,
    },
    parse::parse_tree,
    post::{collect_meta, post_match},
};
use content::Content;
use inline::kinds::{
    Autolink, CodeSpan, Emphasis, HardBreak, InlineHtml, Link, Strikethrough, Text,
};
use registry::{Registry, RegistryBuilder};

/// Options of a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attach source positions to every node.
    pub reserve_position: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            reserve_position: true,
        }
    }
}

/// The GFM recognizer set, ready to be adjusted before building.
pub fn gfm_registry_builder() -> RegistryBuilder {
    Registry::builder()
        .register_block(CodeFence::default())
        .register_block(BlockQuote::default())
        .register_block(Heading::default())
        .register_block(HtmlBlock::default())
        .register_block(Table::default())
        .register_block(SetextHeading::default())
        .register_block(ThematicBreak::default())
        .register_block(List::default())
        .register_block(IndentedCode)
        .register_block(BlankLine)
        .register_block(Definition)
        .block_fallback(Paragraph)
        .register_inline(CodeSpan)
        .register_inline(Autolink)
        .register_inline(InlineHtml)
        .register_inline(HardBreak)
        .register_inline(Link)
        .register_inline(Emphasis)
        .register_inline(Strikethrough)
        .inline_fallback(Text)
}

pub fn gfm_registry() -> Result<Registry> {
    gfm_registry_builder().build()
}

/// A parser bound to one registry. Cheap to share: parsing keeps all
/// mutable state local to the call.
#[derive(Debug)]
pub struct Parser {
    registry: Registry,
}

impl Parser {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn gfm() -> Result<Self> {
        gfm_registry().map(Self::new)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parse(&self, text: &str, options: &ParseOptions) -> Result<Node> {
        self.parse_content(&Content::new(text), options)
    }

    pub fn parse_rope(&self, rope: &Rope, options: &ParseOptions) -> Result<Node> {
        self.parse_content(&Content::from_rope(rope), options)
    }

    fn parse_content(&self, content: &Content, options: &ParseOptions) -> Result<Node> {
        let points = content.points();
        let mut matcher = BlockMatcher::new(&self.registry, points);
        for &line in content.lines() {
            matcher.push(line);
        }
        let mut tree = matcher.finish();
        debug!(
            "matched {} lines into {} block tokens",
            content.lines().len(),
            tree.len()
        );

        post_match(&mut tree, &self.registry, points);
        collect_meta(&mut tree, &self.registry);
        parse_tree(&tree, &self.registry, points, options)
    }
}

/// Parses `text` with the GFM recognizer set.
pub fn parse(text: &str, options: &ParseOptions) -> Result<Node> {
    Parser::gfm()?.parse(text, options)
}
