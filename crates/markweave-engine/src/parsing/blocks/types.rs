use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::ast::{NodeType, node_type};
use crate::parsing::{content::Span, payload::Payload};

use super::content::ContentLine;

/// Index of a token in a [`BlockTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(usize);

/// A block token.
///
/// Tokens are created opening, accept continuation lines while open and are
/// read-only once closed. Containing tokens own child tokens; leaf tokens own
/// raw lines until the parse phase.
#[derive(Debug)]
pub struct BlockToken {
    pub node_type: NodeType,
    pub span: Span,
    /// True while the token still accepts continuation lines.
    pub opening: bool,
    pub containing: bool,
    pub children: Vec<TokenId>,
    pub lines: Vec<ContentLine>,
    pub payload: Payload,
    /// Registry index of the recognizer that opened the token during
    /// matching; `None` for tokens synthesized by post-match rewrites.
    pub(crate) recognizer: Option<usize>,
}

impl BlockToken {
    pub fn leaf(node_type: NodeType, span: Span) -> Self {
        Self {
            node_type,
            span,
            opening: true,
            containing: false,
            children: Vec::new(),
            lines: Vec::new(),
            payload: Payload::none(),
            recognizer: None,
        }
    }

    pub fn container(node_type: NodeType, span: Span) -> Self {
        Self {
            containing: true,
            ..Self::leaf(node_type, span)
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_line(mut self, line: ContentLine) -> Self {
        self.push_line(line);
        self
    }

    /// Appends a line and extends the span to its end.
    pub fn push_line(&mut self, line: ContentLine) {
        self.span.end = self.span.end.max(line.end);
        self.lines.push(line);
    }

    pub fn is_closed(&self) -> bool {
        !self.opening
    }

    pub fn is(&self, ty: &str) -> bool {
        self.node_type == ty
    }
}

/// Arena holding the block token tree of one document plus its meta side
/// channel.
#[derive(Debug)]
pub struct BlockTree {
    tokens: Vec<BlockToken>,
    root: TokenId,
    pub meta: Meta,
}

impl BlockTree {
    pub fn new(len: usize) -> Self {
        let root = BlockToken::container(node_type::ROOT, Span::new(0, len));
        Self {
            tokens: vec![root],
            root: TokenId(0),
            meta: Meta::default(),
        }
    }

    pub fn root(&self) -> TokenId {
        self.root
    }

    pub fn alloc(&mut self, token: BlockToken) -> TokenId {
        self.tokens.push(token);
        TokenId(self.tokens.len() - 1)
    }

    pub fn children(&self, id: TokenId) -> &[TokenId] {
        &self[id].children
    }

    /// The last child of `id` if it is still open.
    pub fn open_child(&self, id: TokenId) -> Option<TokenId> {
        self[id]
            .children
            .last()
            .copied()
            .filter(|c| self[*c].opening)
    }

    /// Deepest open descendant of `id` (`id` itself when it has none).
    pub fn open_tip(&self, id: TokenId) -> TokenId {
        let mut cur = id;
        while let Some(next) = self.open_child(cur) {
            cur = next;
        }
        cur
    }

    /// All descendants of `id` in document order, `id` excluded.
    pub fn descendants(&self, id: TokenId) -> Vec<TokenId> {
        let mut out = Vec::new();
        let mut stack: Vec<TokenId> = self[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self[next].children.iter().rev().copied());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Index<TokenId> for BlockTree {
    type Output = BlockToken;

    fn index(&self, id: TokenId) -> &BlockToken {
        &self.tokens[id.0]
    }
}

impl IndexMut<TokenId> for BlockTree {
    fn index_mut(&mut self, id: TokenId) -> &mut BlockToken {
        &mut self.tokens[id.0]
    }
}

/// Document-level lookup tables built from out-of-flow tokens (e.g. link
/// reference definitions) before the main parse pass.
#[derive(Default)]
pub struct Meta(HashMap<&'static str, Box<dyn Any + Send + Sync>>);

impl Meta {
    pub fn insert<T: Any + Send + Sync>(&mut self, key: &'static str, value: T) {
        self.0.insert(key, Box::new(value));
    }

    pub fn insert_boxed(&mut self, key: &'static str, value: Box<dyn Any + Send + Sync>) {
        self.0.insert(key, value);
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.0.get(key).and_then(|b| b.downcast_ref())
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.0.keys().collect();
        keys.sort();
        f.debug_tuple("Meta").field(&keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_tip_follows_open_last_children() {
        let mut tree = BlockTree::new(10);
        let quote = tree.alloc(BlockToken::container(node_type::BLOCKQUOTE, Span::new(0, 1)));
        let para = tree.alloc(BlockToken::leaf(node_type::PARAGRAPH, Span::new(2, 5)));
        let root = tree.root();
        tree[root].children.push(quote);
        tree[quote].children.push(para);
        assert_eq!(tree.open_tip(root), para);

        tree[para].opening = false;
        assert_eq!(tree.open_tip(root), quote);
        assert_eq!(tree.descendants(root), vec![quote, para]);
    }

    #[test]
    fn meta_is_keyed_and_typed() {
        let mut meta = Meta::default();
        meta.insert("definition", vec![1u32]);
        assert_eq!(meta.get::<Vec<u32>>("definition"), Some(&vec![1]));
        assert!(meta.get::<String>("definition").is_none());
        assert!(meta.get::<Vec<u32>>("other").is_none());
    }
}
