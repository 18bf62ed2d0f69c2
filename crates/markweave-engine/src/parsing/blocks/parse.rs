//! Block parse phase: the finished token tree becomes AST nodes, bottom-up.

use log::debug;

use crate::{
    ast::{Node, Parent},
    error::{Error, Result},
    parsing::{
        ParseOptions,
        content::{NodePoint, Position, Span, position_of, slice_to_string},
        inline::InlineMatcher,
        registry::Registry,
    },
};

use super::{
    content::{ContentLine, phrasing_points, phrasing_span},
    types::{BlockTree, Meta, TokenId},
};

/// What a block parse hook can use besides its own token.
pub struct ParseContext<'a> {
    /// Code points of the whole document.
    pub points: &'a [NodePoint],
    pub meta: &'a Meta,
    pub options: &'a ParseOptions,
    registry: &'a Registry,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        points: &'a [NodePoint],
        meta: &'a Meta,
        registry: &'a Registry,
        options: &'a ParseOptions,
    ) -> Self {
        Self {
            points,
            meta,
            options,
            registry,
        }
    }

    /// Source position of a span, unless positions are switched off.
    pub fn position(&self, span: Span) -> Option<Position> {
        self.options
            .reserve_position
            .then(|| position_of(self.points, span))
    }

    pub fn text(&self, span: Span) -> String {
        slice_to_string(self.points, span)
    }

    /// Runs the inline engine over a phrasing buffer.
    pub fn inline(&self, buffer: &[NodePoint]) -> Result<Vec<Node>> {
        InlineMatcher::new(self.registry, buffer, self.meta, self.options).parse()
    }

    /// Inline nodes of a leaf's lines.
    pub fn phrasing(&self, lines: &[ContentLine]) -> Result<Vec<Node>> {
        self.inline(&phrasing_points(self.points, lines))
    }

    /// Inline nodes of a single-line span.
    pub fn phrasing_span(&self, span: Span) -> Result<Vec<Node>> {
        self.inline(&phrasing_span(self.points, span))
    }
}

/// Parses the whole tree into a root node.
pub fn parse_tree(
    tree: &BlockTree,
    registry: &Registry,
    points: &[NodePoint],
    options: &ParseOptions,
) -> Result<Node> {
    let ctx = ParseContext::new(points, &tree.meta, registry, options);
    let root = tree.root();
    let children = parse_children(tree, root, &ctx)?;
    debug!("parsed {} top-level nodes", children.len());
    Ok(Node::Root(Parent {
        children,
        position: ctx.position(tree[root].span),
    }))
}

fn parse_children(tree: &BlockTree, id: TokenId, ctx: &ParseContext<'_>) -> Result<Vec<Node>> {
    let mut out = Vec::with_capacity(tree[id].children.len());
    for &child in tree.children(id) {
        out.extend(parse_token(tree, child, ctx)?);
    }
    Ok(out)
}

fn parse_token(tree: &BlockTree, id: TokenId, ctx: &ParseContext<'_>) -> Result<Vec<Node>> {
    let token = &tree[id];
    let children = parse_children(tree, id, ctx)?;
    let index = ctx
        .registry
        .block_parser(token.node_type)
        .ok_or_else(|| Error::MissingParser {
            node_type: token.node_type.to_string(),
        })?;
    ctx.registry.block(index).parse(token, children, ctx)
}
